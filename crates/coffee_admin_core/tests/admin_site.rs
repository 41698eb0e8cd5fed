use coffee_admin_core::admin::setup;
use coffee_admin_core::db::open_db_in_memory;
use coffee_admin_core::{
    AdminError, AdminRequest, AdminSite, Beverage, CoffeeOrderAdmin, FormData, ModelStore,
    SqliteCoffeeOrderRepository, SubmitOutcome,
};
use uuid::Uuid;

fn request() -> AdminRequest {
    AdminRequest::new("manager")
}

fn latte_form(reference: &str) -> FormData {
    FormData::from_pairs([
        ("reference", reference),
        ("customer_name", "Ana"),
        ("beverage", "latte"),
        ("size", "medium"),
        ("milk", "oat"),
    ])
}

fn saved_id(outcome: SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Saved { object_id, .. } => object_id,
        SubmitOutcome::Redisplay { errors, .. } => panic!("unexpected redisplay: {errors}"),
    }
}

#[test]
fn setup_registers_coffee_order_admin_once() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();

    assert!(site.is_registered("coffee_order"));
    assert_eq!(site.registered_models(), vec!["coffee_order"]);

    let again = setup(&mut site, &conn).unwrap_err();
    assert!(matches!(again, AdminError::AlreadyRegistered("coffee_order")));

    let repo = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();
    let direct = site.register(CoffeeOrderAdmin::new(repo)).unwrap_err();
    assert!(matches!(direct, AdminError::AlreadyRegistered(_)));
}

#[test]
fn setup_rejects_unmigrated_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let mut site = AdminSite::new();

    let err = setup(&mut site, &conn).unwrap_err();
    assert!(matches!(err, AdminError::Repo(_)));
    assert!(site.registered_models().is_empty());
}

#[test]
fn add_form_saves_new_order() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();
    let reader = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();

    let outcome = site
        .submit("coffee_order", &request(), &latte_form("CAF-0001"), None)
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Saved { change: false, .. }));

    let id = Uuid::parse_str(&saved_id(outcome)).unwrap();
    let stored = reader.get(id).unwrap().unwrap();
    assert_eq!(stored.reference, "CAF-0001");
    assert_eq!(stored.beverage, Beverage::Latte);
}

#[test]
fn add_form_missing_required_field_redisplays_and_saves_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();
    let reader = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();

    let mut form = latte_form("CAF-0001");
    form.insert("customer_name", "  ");
    let outcome = site.submit("coffee_order", &request(), &form, None).unwrap();

    match outcome {
        SubmitOutcome::Redisplay {
            errors,
            form: redisplayed,
        } => {
            assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["customer_name"]);
            assert_eq!(redisplayed, form);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(reader.count().unwrap(), 0);
}

#[test]
fn unparseable_form_values_are_flagged() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();
    let reader = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();

    let mut form = latte_form("CAF-0001");
    form.insert("quantity", "lots");
    let outcome = site.submit("coffee_order", &request(), &form, None).unwrap();

    match outcome {
        SubmitOutcome::Redisplay { errors, .. } => {
            assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["quantity"]);
            assert_eq!(errors.messages_for("quantity"), ["Enter a whole number."]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(reader.count().unwrap(), 0);
}

#[test]
fn unbound_and_invalid_fields_are_flagged_together() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();
    let reader = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();

    let form = FormData::from_pairs([
        ("reference", "bad"),
        ("customer_name", ""),
        ("beverage", "tea"),
        ("size", "small"),
    ]);
    let outcome = site.submit("coffee_order", &request(), &form, None).unwrap();

    match outcome {
        SubmitOutcome::Redisplay { errors, .. } => {
            assert_eq!(
                errors.fields().collect::<Vec<_>>(),
                vec!["beverage", "customer_name", "reference"]
            );
            assert_eq!(errors.messages_for("beverage").len(), 1);
            assert!(errors.messages_for("beverage")[0].contains("`tea`"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(reader.count().unwrap(), 0);
}

#[test]
fn change_form_updates_existing_order() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();
    let reader = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();

    let id = saved_id(
        site.submit("coffee_order", &request(), &latte_form("CAF-0001"), None)
            .unwrap(),
    );

    let edit = FormData::from_pairs([("quantity", "3"), ("notes", "two sugars")]);
    let outcome = site
        .submit("coffee_order", &request(), &edit, Some(&id))
        .unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Saved {
            object_id: id.clone(),
            change: true
        }
    );

    let stored = reader.get(Uuid::parse_str(&id).unwrap()).unwrap().unwrap();
    assert_eq!(stored.quantity, 3);
    assert_eq!(stored.notes, "two sugars");
    assert_eq!(stored.customer_name, "Ana");
    assert_eq!(reader.count().unwrap(), 1);
}

#[test]
fn invalid_change_form_keeps_stored_values() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();
    let reader = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();

    let id = saved_id(
        site.submit("coffee_order", &request(), &latte_form("CAF-0001"), None)
            .unwrap(),
    );
    let before = reader.get(Uuid::parse_str(&id).unwrap()).unwrap().unwrap();

    let edit = FormData::from_pairs([("beverage", "espresso"), ("quantity", "21")]);
    let outcome = site
        .submit("coffee_order", &request(), &edit, Some(&id))
        .unwrap();

    match outcome {
        SubmitOutcome::Redisplay { errors, .. } => {
            assert!(errors.has_field("quantity"));
            assert!(errors.has_field("milk"));
            assert!(errors.has_field("size"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    let after = reader.get(before.id).unwrap().unwrap();
    assert_eq!(after, before);
}

#[test]
fn blank_required_choice_on_change_form_is_flagged() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();
    let reader = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();

    let id = saved_id(
        site.submit("coffee_order", &request(), &latte_form("CAF-0001"), None)
            .unwrap(),
    );
    let before = reader.get(Uuid::parse_str(&id).unwrap()).unwrap().unwrap();

    let edit = FormData::from_pairs([("beverage", ""), ("size", ""), ("quantity", "")]);
    let outcome = site
        .submit("coffee_order", &request(), &edit, Some(&id))
        .unwrap();

    match outcome {
        SubmitOutcome::Redisplay { errors, .. } => {
            assert_eq!(
                errors.fields().collect::<Vec<_>>(),
                vec!["beverage", "quantity", "size"]
            );
            assert_eq!(errors.messages_for("beverage"), ["This field is required."]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(reader.get(before.id).unwrap(), Some(before));
}

#[test]
fn change_form_for_unknown_object_is_an_error() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();

    let missing = Uuid::new_v4().to_string();
    let err = site
        .submit("coffee_order", &request(), &FormData::new(), Some(&missing))
        .unwrap_err();
    assert!(matches!(err, AdminError::ObjectNotFound { ref id, .. } if *id == missing));

    let err = site
        .submit("coffee_order", &request(), &FormData::new(), Some("not-a-uuid"))
        .unwrap_err();
    assert!(matches!(err, AdminError::ObjectNotFound { .. }));
}

#[test]
fn submit_to_unregistered_model_is_rejected() {
    let site = AdminSite::new();
    let err = site
        .submit("tea_order", &request(), &FormData::new(), None)
        .unwrap_err();
    assert!(matches!(err, AdminError::NotRegistered(ref name) if name == "tea_order"));
}

#[test]
fn delete_through_site_removes_order() {
    let conn = open_db_in_memory().unwrap();
    let mut site = AdminSite::new();
    setup(&mut site, &conn).unwrap();
    let reader = SqliteCoffeeOrderRepository::try_new(&conn).unwrap();

    let id = saved_id(
        site.submit("coffee_order", &request(), &latte_form("CAF-0001"), None)
            .unwrap(),
    );
    site.delete("coffee_order", &request(), &id).unwrap();

    assert_eq!(reader.count().unwrap(), 0);
    assert!(matches!(
        site.delete("coffee_order", &request(), &id),
        Err(AdminError::ObjectNotFound { .. })
    ));
}
