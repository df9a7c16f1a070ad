//! # Pickup Commands
//!
//! The pickup window: the queue of orders waiting to be handed over and the
//! status changes counter staff make.
//!
//! ```text
//! kitchen:  start_preparation ──► mark_ready
//! counter:  deliver_order("confirmar")
//! cashier:  mark_paid (any time before or after delivery)
//! ```

use cafeteria_core::{CoreResult, Order, PaymentDetails, PaymentMethod};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::commands::checkout::OrderResponse;
use crate::error::ApiError;
use crate::state::{ConfigState, OrderLedger};

/// An order in the pickup queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupTicket {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub username: String,
}

/// Payment as reported by the cashier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub auth_code: Option<String>,
    pub reference: Option<String>,
}

impl From<PaymentRequest> for PaymentDetails {
    fn from(request: PaymentRequest) -> Self {
        PaymentDetails {
            method: request.method,
            transaction_id: request.transaction_id,
            auth_code: request.auth_code,
            reference: request.reference,
        }
    }
}

/// Orders being prepared, ready, or paid and not yet delivered.
///
/// ## Arguments
/// * `search` - Case-insensitive match on order number or username
pub fn pickup_queue(
    ledger: &OrderLedger,
    config: &ConfigState,
    search: Option<&str>,
) -> Result<Vec<PickupTicket>, ApiError> {
    debug!(?search, "pickup_queue command");

    Ok(ledger
        .pickup_queue(search.unwrap_or(""))?
        .into_iter()
        .map(|(order, username)| PickupTicket {
            order: OrderResponse::from_order(&order, config),
            username,
        })
        .collect())
}

fn change_order<F>(
    ledger: &OrderLedger,
    config: &ConfigState,
    order_number: &str,
    action: &str,
    change: F,
) -> Result<OrderResponse, ApiError>
where
    F: FnOnce(&mut Order) -> CoreResult<()>,
{
    let order = ledger
        .update_order(order_number.trim(), change)
        .map_err(|err| {
            warn!(order_number = %order_number, action, error = %err, "Order change rejected");
            err
        })?;

    info!(
        order_number = %order.order_number,
        action,
        fulfillment = %order.fulfillment,
        payment = %order.payment,
        "Order updated"
    );
    Ok(OrderResponse::from_order(&order, config))
}

/// Kitchen starts a pending order.
pub fn start_preparation(
    ledger: &OrderLedger,
    config: &ConfigState,
    order_number: &str,
) -> Result<OrderResponse, ApiError> {
    debug!(order_number = %order_number, "start_preparation command");
    change_order(ledger, config, order_number, "start_preparation", Order::start_preparation)
}

/// Kitchen finishes an order.
pub fn mark_ready(
    ledger: &OrderLedger,
    config: &ConfigState,
    order_number: &str,
) -> Result<OrderResponse, ApiError> {
    debug!(order_number = %order_number, "mark_ready command");
    change_order(ledger, config, order_number, "mark_ready", Order::mark_ready)
}

/// Cashier records payment.
pub fn mark_paid(
    ledger: &OrderLedger,
    config: &ConfigState,
    order_number: &str,
    payment: PaymentRequest,
) -> Result<OrderResponse, ApiError> {
    debug!(order_number = %order_number, method = ?payment.method, "mark_paid command");
    change_order(ledger, config, order_number, "mark_paid", |order| {
        order.mark_paid(payment.into())
    })
}

/// Hands a ready order to the customer.
///
/// `confirmation` must be the confirmation word typed by the operator.
pub fn deliver_order(
    ledger: &OrderLedger,
    config: &ConfigState,
    order_number: &str,
    confirmation: &str,
) -> Result<OrderResponse, ApiError> {
    debug!(order_number = %order_number, "deliver_order command");
    change_order(ledger, config, order_number, "deliver", |order| {
        order.deliver(confirmation)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, AddToCartRequest};
    use crate::commands::checkout::{place_order, PlaceOrderRequest};
    use crate::commands::test_support::{counter, Counter};
    use crate::error::ErrorCode;
    use cafeteria_core::{FulfillmentStatus, PaymentStatus};

    fn order_for(c: &Counter, username: &str) -> String {
        add_to_cart(
            &c.catalog,
            &c.carts,
            &c.ledger,
            &c.config,
            username,
            AddToCartRequest {
                product_id: "croissant".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        place_order(
            &c.catalog,
            &c.carts,
            &c.ledger,
            &c.config,
            username,
            PlaceOrderRequest::default(),
        )
        .unwrap()
        .order_number
    }

    #[test]
    fn test_full_pickup_flow() {
        let c = counter();
        let number = order_for(&c, "ana");

        // Pending and unpaid orders are not at the window yet.
        assert!(pickup_queue(&c.ledger, &c.config, None).unwrap().is_empty());

        let order = start_preparation(&c.ledger, &c.config, &number).unwrap();
        assert_eq!(order.fulfillment, FulfillmentStatus::InPreparation);

        let queue = pickup_queue(&c.ledger, &c.config, None).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].username, "ana");

        mark_ready(&c.ledger, &c.config, &number).unwrap();
        let order = mark_paid(
            &c.ledger,
            &c.config,
            &number,
            PaymentRequest {
                method: PaymentMethod::Cash,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(order.payment, PaymentStatus::Paid);
        assert_eq!(order.payment_method, PaymentMethod::Cash);

        let order = deliver_order(&c.ledger, &c.config, &number, "confirmar").unwrap();
        assert_eq!(order.fulfillment, FulfillmentStatus::Delivered);
        assert!(pickup_queue(&c.ledger, &c.config, None).unwrap().is_empty());
    }

    #[test]
    fn test_paid_pending_order_is_queued() {
        let c = counter();
        let number = order_for(&c, "ana");
        mark_paid(&c.ledger, &c.config, &number, PaymentRequest::default()).unwrap();

        let queue = pickup_queue(&c.ledger, &c.config, None).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].order.fulfillment, FulfillmentStatus::Pending);
    }

    #[test]
    fn test_queue_search() {
        let c = counter();
        let ana = order_for(&c, "ana");
        let luis = order_for(&c, "luis");
        start_preparation(&c.ledger, &c.config, &ana).unwrap();
        start_preparation(&c.ledger, &c.config, &luis).unwrap();

        let queue = pickup_queue(&c.ledger, &c.config, Some("LUIS")).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].order.order_number, luis);

        let queue = pickup_queue(&c.ledger, &c.config, Some(&ana.to_lowercase())).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].username, "ana");
    }

    #[test]
    fn test_rejected_transitions_leave_order_unchanged() {
        let c = counter();
        let number = order_for(&c, "ana");

        let err = mark_ready(&c.ledger, &c.config, &number).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        start_preparation(&c.ledger, &c.config, &number).unwrap();
        mark_ready(&c.ledger, &c.config, &number).unwrap();

        let err = deliver_order(&c.ledger, &c.config, &number, "si").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        let order = c.ledger.order(&number).unwrap();
        assert_eq!(order.fulfillment, FulfillmentStatus::Ready);

        mark_paid(&c.ledger, &c.config, &number, PaymentRequest::default()).unwrap();
        let err =
            mark_paid(&c.ledger, &c.config, &number, PaymentRequest::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn test_unknown_order_number() {
        let c = counter();
        let err = start_preparation(&c.ledger, &c.config, "PED-00000000").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
