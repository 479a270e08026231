use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::orders::{OrderList, OrderWithItems, PlaceOrderRequest, UpdateOrderStatusRequest};
use crate::{
    aggregate::{self, LineItem},
    audit::log_audit,
    entity::{
        menu_items::{Column as MenuCol, Entity as MenuItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        restaurants::Entity as Restaurants,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::notification_service,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<Order>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Place an order directly from a restaurant's menu. Unit prices are
/// snapshotted from the menu rows locked in the transaction; the stored
/// total is derived from the items plus tax and the restaurant's delivery
/// fee, never supplied by the client.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }
    if payload.delivery_address.trim().is_empty() {
        return Err(AppError::BadRequest("Delivery address is required".into()));
    }

    let txn = state.orm.begin().await?;

    let restaurant = Restaurants::find_by_id(payload.restaurant_id)
        .one(&txn)
        .await?;
    let restaurant = match restaurant {
        Some(r) => r,
        None => return Err(AppError::BadRequest("Restaurant not found".into())),
    };

    let menu_item_ids: Vec<Uuid> = payload.items.iter().map(|i| i.menu_item_id).collect();
    let menu_rows = MenuItems::find()
        .filter(MenuCol::Id.is_in(menu_item_ids))
        .filter(MenuCol::RestaurantId.eq(restaurant.id))
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    let mut line_items: Vec<LineItem> = Vec::with_capacity(payload.items.len());
    let mut priced: Vec<(Uuid, i32, i64, Option<String>)> = Vec::with_capacity(payload.items.len());
    for requested in &payload.items {
        if requested.quantity <= 0 {
            return Err(AppError::BadRequest("Order has invalid quantity".into()));
        }
        let menu_item = menu_rows
            .iter()
            .find(|m| m.id == requested.menu_item_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Menu item {} not found for this restaurant",
                    requested.menu_item_id
                ))
            })?;
        if !menu_item.available {
            return Err(AppError::BadRequest(format!(
                "Menu item {} is unavailable",
                menu_item.name
            )));
        }
        line_items.push(LineItem::new(menu_item.price, requested.quantity));
        priced.push((
            menu_item.id,
            requested.quantity,
            menu_item.price,
            requested.notes.clone(),
        ));
    }

    let subtotal = aggregate::subtotal(&line_items);
    let tax = subtotal * state.config.tax_rate_bps / 10_000;
    let delivery_fee = restaurant.delivery_fee;
    let total = aggregate::order_total(&line_items, tax, delivery_fee);

    let order_id = Uuid::new_v4();
    let order_number = build_order_number(order_id);

    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(order_number),
        user_id: Set(user.user_id),
        restaurant_id: Set(restaurant.id),
        status: Set(OrderStatus::Pending.to_string()),
        subtotal: Set(subtotal),
        tax: Set(tax),
        delivery_fee: Set(delivery_fee),
        total: Set(total),
        delivery_address: Set(payload.delivery_address),
        delivery_instructions: Set(payload.delivery_instructions),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::new();
    for (menu_item_id, quantity, price, notes) in priced {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(menu_item_id),
            quantity: Set(quantity),
            price: Set(price),
            notes: Set(notes),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    if let Err(err) = notification_service::notify(
        &state.pool,
        restaurant.owner_id,
        "order",
        "New order received",
        Some(order.id),
        Some("order"),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_place",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order)?,
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Customer-side cancellation; legal only while the kitchen has not finished
/// the order.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = parse_status(&order.status)?;
    if !current.can_transition_to(OrderStatus::Cancelled) {
        return Err(AppError::BadRequest(format!(
            "Cannot cancel an order in status {current}"
        )));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Cancelled.to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// Owner dashboard: orders for one owned restaurant.
pub async fn list_restaurant_orders(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    crate::services::restaurant_service::find_owned(state, user, restaurant_id).await?;

    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::RestaurantId.eq(restaurant_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<Order>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Owner advances an order along the status progression; illegal jumps are
/// rejected. The customer is notified on success.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    crate::services::restaurant_service::find_owned(state, user, order.restaurant_id).await?;

    let current = parse_status(&order.status)?;
    let next = payload.status;
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Illegal status transition {current} -> {next}"
        )));
    }

    let customer_id = order.user_id;
    let mut active: OrderActive = order.into();
    active.status = Set(next.to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = notification_service::notify(
        &state.pool,
        customer_id,
        "order",
        &format!("Your order {} is now {next}", order.order_number),
        Some(order.id),
        Some("order"),
    )
    .await
    {
        tracing::warn!(error = %err, "notification failed");
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

fn parse_status(raw: &str) -> AppResult<OrderStatus> {
    OrderStatus::from_str(raw).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    Ok(Order {
        id: model.id,
        order_number: model.order_number,
        user_id: model.user_id,
        restaurant_id: model.restaurant_id,
        status: parse_status(&model.status)?,
        subtotal: model.subtotal,
        tax: model.tax,
        delivery_fee: model.delivery_fee,
        total: model.total,
        delivery_address: model.delivery_address,
        delivery_instructions: model.delivery_instructions,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_item_id: model.menu_item_id,
        quantity: model.quantity,
        price: model.price,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("ORD-{}-{}", date, short)
}
