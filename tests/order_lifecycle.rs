use chrono::Utc;
use storefront_api::{
    entity::orders::OrderStatus,
    error::AppError,
    lifecycle::{Actor, OrderSnapshot, Transition, plan},
    models::Role,
};
use uuid::Uuid;

fn staff(id: Uuid) -> Actor {
    Actor {
        id,
        role: Role::Staff,
    }
}

fn admin(id: Uuid) -> Actor {
    Actor {
        id,
        role: Role::Admin,
    }
}

fn customer(id: Uuid) -> Actor {
    Actor {
        id,
        role: Role::Customer,
    }
}

/// Mirrors the service: reject unless the guard admits, otherwise apply the effect.
fn run(order: &mut OrderSnapshot, transition: Transition, actor: Actor) -> Result<(), AppError> {
    let (guard, effect) = plan(transition, actor)?;
    if !guard.admits(order) {
        return Err(guard.rejection(transition, Some(order)));
    }
    effect.apply(order, Utc::now());
    Ok(())
}

#[test]
fn happy_path_through_complete() {
    let buyer = Uuid::new_v4();
    let clerk = Uuid::new_v4();
    let mut order = OrderSnapshot::placed_by(buyer);

    run(&mut order, Transition::Confirm, staff(clerk)).unwrap();
    assert_eq!(order.status, OrderStatus::Transaction);
    assert_eq!(order.employee_id, Some(clerk));
    assert!(order.confirm_date.is_some());

    run(&mut order, Transition::Shipping, staff(clerk)).unwrap();
    assert_eq!(order.status, OrderStatus::Shipping);
    assert!(order.shipment_date.is_some());

    run(&mut order, Transition::Payment, staff(clerk)).unwrap();
    assert_eq!(order.status, OrderStatus::Shipping);
    assert!(order.payment_date.is_some());

    run(&mut order, Transition::Complete, staff(clerk)).unwrap();
    assert_eq!(order.status, OrderStatus::Complete);
}

#[test]
fn second_confirm_is_invalid_state_and_keeps_employee() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let mut order = OrderSnapshot::placed_by(Uuid::new_v4());

    run(&mut order, Transition::Confirm, staff(first)).unwrap();
    let err = run(&mut order, Transition::Confirm, staff(second)).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(order.employee_id, Some(first));

    let err = run(&mut order, Transition::Confirm, admin(second)).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(order.employee_id, Some(first));
}

#[test]
fn customer_payment_then_confirm_assigns_employee_once() {
    let buyer = Uuid::new_v4();
    let clerk = Uuid::new_v4();
    let mut order = OrderSnapshot::placed_by(buyer);

    run(&mut order, Transition::Payment, customer(buyer)).unwrap();
    assert_eq!(order.status, OrderStatus::Transaction);
    assert!(order.payment_date.is_some());
    assert_eq!(order.employee_id, None);

    run(&mut order, Transition::Confirm, staff(clerk)).unwrap();
    assert_eq!(order.employee_id, Some(clerk));
    assert_eq!(order.status, OrderStatus::Transaction);
}

#[test]
fn payment_is_recorded_at_most_once() {
    let buyer = Uuid::new_v4();
    let mut order = OrderSnapshot::placed_by(buyer);
    run(&mut order, Transition::Payment, customer(buyer)).unwrap();
    let first = order.payment_date;

    let err = run(&mut order, Transition::Payment, customer(buyer)).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(order.payment_date, first);
}

#[test]
fn customer_cannot_pay_for_someone_elses_order() {
    let mut order = OrderSnapshot::placed_by(Uuid::new_v4());
    let err = run(&mut order, Transition::Payment, customer(Uuid::new_v4())).unwrap_err();
    assert!(matches!(err, AppError::NotFound("Order")));
}

#[test]
fn complete_before_payment_is_invalid_state() {
    let clerk = Uuid::new_v4();
    let mut order = OrderSnapshot::placed_by(Uuid::new_v4());
    run(&mut order, Transition::Confirm, staff(clerk)).unwrap();
    run(&mut order, Transition::Shipping, staff(clerk)).unwrap();

    let err = run(&mut order, Transition::Complete, staff(clerk)).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(order.status, OrderStatus::Shipping);
}

#[test]
fn only_the_assigned_employee_ships() {
    let clerk = Uuid::new_v4();
    let mut order = OrderSnapshot::placed_by(Uuid::new_v4());
    run(&mut order, Transition::Confirm, staff(clerk)).unwrap();

    let err = run(&mut order, Transition::Shipping, staff(Uuid::new_v4())).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(order.status, OrderStatus::Transaction);
}

#[test]
fn cancel_from_every_live_state_but_not_twice() {
    let clerk = Uuid::new_v4();
    let mut fresh = OrderSnapshot::placed_by(Uuid::new_v4());
    run(&mut fresh, Transition::Cancel, admin(clerk)).unwrap();
    assert_eq!(fresh.status, OrderStatus::Cancel);
    assert!(fresh.cancel_date.is_some());
    let err = run(&mut fresh, Transition::Cancel, admin(clerk)).unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let mut completed = OrderSnapshot::placed_by(Uuid::new_v4());
    run(&mut completed, Transition::Confirm, staff(clerk)).unwrap();
    run(&mut completed, Transition::Shipping, staff(clerk)).unwrap();
    run(&mut completed, Transition::Payment, staff(clerk)).unwrap();
    run(&mut completed, Transition::Complete, staff(clerk)).unwrap();
    run(&mut completed, Transition::Cancel, staff(clerk)).unwrap();
    assert_eq!(completed.status, OrderStatus::Cancel);
}

#[test]
fn staff_cancel_requires_assignment_admin_does_not() {
    let clerk = Uuid::new_v4();
    let mut order = OrderSnapshot::placed_by(Uuid::new_v4());
    run(&mut order, Transition::Confirm, staff(clerk)).unwrap();

    let err = run(&mut order, Transition::Cancel, staff(Uuid::new_v4())).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    run(&mut order, Transition::Cancel, admin(Uuid::new_v4())).unwrap();
    assert_eq!(order.status, OrderStatus::Cancel);
    assert_eq!(order.employee_id, Some(clerk));
}

#[test]
fn customers_only_plan_payment() {
    let buyer = customer(Uuid::new_v4());
    for transition in [
        Transition::Confirm,
        Transition::Shipping,
        Transition::Complete,
        Transition::Cancel,
    ] {
        assert!(matches!(plan(transition, buyer), Err(AppError::Forbidden(_))));
    }
    assert!(plan(Transition::Payment, buyer).is_ok());
}

#[test]
fn rejection_of_a_missing_order_is_not_found() {
    let (guard, _) = plan(Transition::Confirm, staff(Uuid::new_v4())).unwrap();
    assert!(matches!(
        guard.rejection(Transition::Confirm, None),
        AppError::NotFound("Order")
    ));
}

#[test]
fn admitted_order_on_reread_means_lost_race() {
    let order = OrderSnapshot::placed_by(Uuid::new_v4());
    let (guard, _) = plan(Transition::Confirm, staff(Uuid::new_v4())).unwrap();
    assert!(guard.admits(&order));
    assert!(matches!(
        guard.rejection(Transition::Confirm, Some(&order)),
        AppError::InvalidState(_)
    ));
}
