//! Order status machine.
//!
//! A transition is planned from the actor alone into a [`Guard`] (what the
//! stored order must look like) and an [`Effect`] (what gets written). The
//! order service turns the guard into the `WHERE` clause of a single
//! conditional `UPDATE`, so checking and writing happen in one statement.
//! When that update matches nothing, [`Guard::rejection`] explains why from a
//! fresh read of the order.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{entity::orders, entity::orders::OrderStatus, error::AppError, models::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Confirm,
    Payment,
    Shipping,
    Complete,
    Cancel,
}

impl Transition {
    pub fn action(&self) -> &'static str {
        match self {
            Transition::Confirm => "order_confirm",
            Transition::Payment => "order_payment",
            Transition::Shipping => "order_shipping",
            Transition::Complete => "order_complete",
            Transition::Cancel => "order_cancel",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

/// Milestone timestamp written by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Confirm,
    Payment,
    Shipment,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub from: &'static [OrderStatus],
    pub customer: Option<Uuid>,
    pub employee: Option<Uuid>,
    pub unconfirmed: bool,
    pub unpaid: bool,
    pub paid: bool,
}

impl Guard {
    fn when(states: &'static [OrderStatus]) -> Self {
        Self {
            from: states,
            customer: None,
            employee: None,
            unconfirmed: false,
            unpaid: false,
            paid: false,
        }
    }

    pub fn admits(&self, order: &OrderSnapshot) -> bool {
        self.from.contains(&order.status)
            && (!self.unconfirmed || order.confirm_date.is_none())
            && (!self.unpaid || order.payment_date.is_none())
            && (!self.paid || order.payment_date.is_some())
            && self.customer.is_none_or(|id| order.customer_id == id)
            && self.employee.is_none_or(|id| order.employee_id == Some(id))
    }

    /// Error for a conditional update that matched no row, given the order as it
    /// reads now (`None` when it does not exist).
    pub fn rejection(&self, transition: Transition, order: Option<&OrderSnapshot>) -> AppError {
        let Some(order) = order else {
            return AppError::NotFound("Order");
        };
        if self.customer.is_some_and(|id| order.customer_id != id) {
            return AppError::NotFound("Order");
        }
        if !self.from.contains(&order.status) {
            return AppError::InvalidState(format!(
                "Cannot {} an order in status '{}'",
                verb(transition),
                order.status.as_str()
            ));
        }
        if self.unconfirmed && order.confirm_date.is_some() {
            return AppError::InvalidState("Order has already been confirmed".into());
        }
        if self.unpaid && order.payment_date.is_some() {
            return AppError::InvalidState("Order has already been paid".into());
        }
        if self.paid && order.payment_date.is_none() {
            return AppError::InvalidState("Order has not been paid".into());
        }
        if self.employee.is_some_and(|id| order.employee_id != Some(id)) {
            return AppError::Forbidden("Order is handled by another employee".into());
        }
        AppError::InvalidState("Order was modified concurrently, try again".into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub status: Option<OrderStatus>,
    pub milestone: Option<Milestone>,
    pub assign_employee: Option<Uuid>,
}

impl Effect {
    /// In-memory counterpart of the update the service issues.
    pub fn apply(&self, order: &mut OrderSnapshot, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            order.status = status;
        }
        match self.milestone {
            Some(Milestone::Confirm) => order.confirm_date = Some(now),
            Some(Milestone::Payment) => order.payment_date = Some(now),
            Some(Milestone::Shipment) => order.shipment_date = Some(now),
            Some(Milestone::Cancel) => order.cancel_date = Some(now),
            None => {}
        }
        if let Some(employee) = self.assign_employee {
            order.employee_id = Some(employee);
        }
    }
}

const CONFIRMABLE: &[OrderStatus] = &[OrderStatus::Order, OrderStatus::Transaction];
const CANCELLABLE: &[OrderStatus] = &[
    OrderStatus::Order,
    OrderStatus::Transaction,
    OrderStatus::Shipping,
    OrderStatus::Complete,
];

/// Role checks happen here; everything that depends on the stored order goes
/// into the returned guard.
pub fn plan(transition: Transition, actor: Actor) -> Result<(Guard, Effect), AppError> {
    let employee = actor.role.is_employee();
    let plan = match transition {
        Transition::Confirm if employee => (
            Guard {
                unconfirmed: true,
                ..Guard::when(CONFIRMABLE)
            },
            Effect {
                status: Some(OrderStatus::Transaction),
                milestone: Some(Milestone::Confirm),
                assign_employee: Some(actor.id),
            },
        ),
        Transition::Payment if employee => (
            Guard {
                employee: Some(actor.id),
                unpaid: true,
                ..Guard::when(&[OrderStatus::Shipping])
            },
            Effect {
                status: None,
                milestone: Some(Milestone::Payment),
                assign_employee: None,
            },
        ),
        Transition::Payment => (
            Guard {
                customer: Some(actor.id),
                unpaid: true,
                ..Guard::when(&[OrderStatus::Order])
            },
            Effect {
                status: Some(OrderStatus::Transaction),
                milestone: Some(Milestone::Payment),
                assign_employee: None,
            },
        ),
        Transition::Shipping if employee => (
            Guard {
                employee: Some(actor.id),
                ..Guard::when(&[OrderStatus::Transaction])
            },
            Effect {
                status: Some(OrderStatus::Shipping),
                milestone: Some(Milestone::Shipment),
                assign_employee: None,
            },
        ),
        Transition::Complete if employee => (
            Guard {
                employee: Some(actor.id),
                paid: true,
                ..Guard::when(&[OrderStatus::Shipping])
            },
            Effect {
                status: Some(OrderStatus::Complete),
                milestone: None,
                assign_employee: None,
            },
        ),
        Transition::Cancel if employee => (
            Guard {
                employee: (actor.role == Role::Staff).then_some(actor.id),
                ..Guard::when(CANCELLABLE)
            },
            Effect {
                status: Some(OrderStatus::Cancel),
                milestone: Some(Milestone::Cancel),
                assign_employee: None,
            },
        ),
        _ => return Err(AppError::forbidden()),
    };
    Ok(plan)
}

fn verb(transition: Transition) -> &'static str {
    match transition {
        Transition::Confirm => "confirm",
        Transition::Payment => "pay for",
        Transition::Shipping => "ship",
        Transition::Complete => "complete",
        Transition::Cancel => "cancel",
    }
}

/// The fields of an order the status machine reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    pub status: OrderStatus,
    pub customer_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub confirm_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub shipment_date: Option<DateTime<Utc>>,
    pub cancel_date: Option<DateTime<Utc>>,
}

impl OrderSnapshot {
    pub fn placed_by(customer_id: Uuid) -> Self {
        Self {
            status: OrderStatus::Order,
            customer_id,
            employee_id: None,
            confirm_date: None,
            payment_date: None,
            shipment_date: None,
            cancel_date: None,
        }
    }
}

impl From<&orders::Model> for OrderSnapshot {
    fn from(model: &orders::Model) -> Self {
        Self {
            status: model.status,
            customer_id: model.customer_id,
            employee_id: model.employee_id,
            confirm_date: model.confirm_date.map(|dt| dt.with_timezone(&Utc)),
            payment_date: model.payment_date.map(|dt| dt.with_timezone(&Utc)),
            shipment_date: model.shipment_date.map(|dt| dt.with_timezone(&Utc)),
            cancel_date: model.cancel_date.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
