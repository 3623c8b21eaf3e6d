use parcel_payload::{Context, Host, LaunchFlags, Payload};
use parcel_sample::model::Book;
use parcel_sample::screens::{
    Detail, DetailCreator, PayloadBinder, Splash, SplashCreator, Ticket, TicketCreator,
};
use parcel_sample::{Home, HomeCreator, deliver};

fn context() -> Context {
    Context::new("tests")
}

fn book() -> Book {
    Book {
        title: String::from("Dune"),
        pages: 412,
        authors: vec![String::from("Frank Herbert")],
    }
}

// -----------------------------------------------------------------------------
// Creators

#[test]
fn ticket_required_only() {
    let payload = TicketCreator::new(&context(), 42).create().unwrap();

    assert_eq!(payload.target(), Ticket::target());
    assert_eq!(payload.origin(), "tests");
    assert_eq!(payload.get_long("id", -1), 42);
    assert!(!payload.contains_key("label"));
    assert_eq!(payload.keys().collect::<Vec<_>>(), ["id"]);
}

#[test]
fn ticket_with_label() {
    let payload = TicketCreator::new(&context(), 42)
        .label("x")
        .create()
        .unwrap();

    assert_eq!(payload.len(), 2);
    assert_eq!(payload.get_long("id", -1), 42);
    assert_eq!(payload.get_string("label").as_deref(), Some("x"));
}

#[test]
fn flags_accumulate() {
    let payload = TicketCreator::new(&context(), 1)
        .add_flags(&[LaunchFlags::NEW_TASK])
        .add_flags(&[LaunchFlags::CLEAR_TOP, LaunchFlags::NEW_TASK])
        .create()
        .unwrap();

    assert_eq!(payload.flags(), LaunchFlags::NEW_TASK | LaunchFlags::CLEAR_TOP);
}

#[test]
fn custom_keys_and_targets() {
    let payload = HomeCreator::new(&context())
        .user("ada")
        .create()
        .unwrap();
    assert_eq!(payload.get_string("user_name").as_deref(), Some("ada"));
    assert!(!payload.contains_key("user"));

    let splash = SplashCreator::new(&context()).create().unwrap();
    assert_eq!(splash.target(), "screens.Splash");
    assert!(splash.is_empty());
}

// -----------------------------------------------------------------------------
// Binders

#[test]
fn ticket_round_trip() {
    let payload = TicketCreator::new(&context(), 42)
        .label("x")
        .create()
        .unwrap();

    let mut ticket: Ticket = deliver(payload);
    assert!(PayloadBinder::bind_ticket(&mut ticket));
    assert_eq!(ticket.id, 42);
    assert_eq!(ticket.label.as_deref(), Some("x"));
}

#[test]
fn absent_optional_stays_none() {
    let payload = TicketCreator::new(&context(), 7).create().unwrap();

    let mut ticket: Ticket = deliver(payload);
    ticket.label = Some(String::from("stale"));
    assert!(PayloadBinder::bind_ticket(&mut ticket));
    assert_eq!(ticket.id, 7);
    assert_eq!(ticket.label, None);
}

#[test]
fn bind_without_payload() {
    let mut ticket = Ticket::default();
    ticket.id = 3;
    assert!(!PayloadBinder::bind_ticket(&mut ticket));
    assert_eq!(ticket.id, 3);
}

#[test]
fn detail_round_trip() {
    let sequel = Book {
        title: String::from("Dune Messiah"),
        ..book()
    };
    let payload = DetailCreator::new(&context(), book())
        .chapter(4)
        .count(12)
        .note("dog-eared")
        .sequel(sequel.clone())
        .create()
        .unwrap();
    assert_eq!(payload.get_string("detail_note").as_deref(), Some("dog-eared"));

    let mut detail: Detail = deliver(payload);
    detail.scroll = 80;
    assert!(PayloadBinder::bind_detail(&mut detail));

    assert_eq!(detail.book, book());
    assert_eq!(detail.chapter, Some(4));
    assert_eq!(detail.count, 12);
    assert_eq!(detail.note, "dog-eared");
    assert_eq!(detail.sequel, Some(sequel));
    assert_eq!(detail.scroll, 80);
}

#[test]
fn detail_absent_values() {
    let payload = DetailCreator::new(&context(), book()).create().unwrap();
    let mut detail: Detail = deliver(payload);
    assert!(PayloadBinder::bind_detail(&mut detail));

    // Numbers fall back to -1, strings to empty, objects to `None`.
    assert_eq!(detail.chapter, Some(-1));
    assert_eq!(detail.count, -1);
    assert_eq!(detail.note, "");
    assert_eq!(detail.sequel, None);
}

#[test]
fn plain_object_kept_when_absent() {
    let mut payload = Payload::new(&context(), Detail::target());
    payload.put_int("count", 5);

    let mut detail: Detail = deliver(payload);
    detail.book = book();
    assert!(PayloadBinder::bind_detail(&mut detail));
    assert_eq!(detail.book, book());
    assert_eq!(detail.count, 5);
}

#[test]
fn mismatched_kind_reads_default() {
    let mut payload = Payload::new(&context(), Ticket::target());
    payload.put_string("id", "not a number");

    let mut ticket: Ticket = deliver(payload);
    assert!(PayloadBinder::bind_ticket(&mut ticket));
    assert_eq!(ticket.id, -1);
}

#[test]
fn root_module_binder() {
    let payload = HomeCreator::new(&context())
        .user("ada")
        .create()
        .unwrap();
    let mut home: Home = deliver(payload);
    assert!(parcel_sample::PayloadBinder::bind_home(&mut home));
    assert_eq!(home.user.as_deref(), Some("ada"));
}

#[test]
fn survives_serialization() {
    let payload = DetailCreator::new(&context(), book())
        .chapter(2)
        .add_flags(&[LaunchFlags::SINGLE_TOP])
        .create()
        .unwrap();
    let text = serde_json::to_string(&payload).unwrap();
    let received: Payload = serde_json::from_str(&text).unwrap();
    assert_eq!(received, payload);

    let mut detail: Detail = deliver(received);
    assert!(PayloadBinder::bind_detail(&mut detail));
    assert_eq!(detail.book, book());
    assert_eq!(detail.chapter, Some(2));
}

#[test]
fn splash_is_a_host_without_binder() {
    let payload = SplashCreator::new(&context()).create().unwrap();
    let splash: Splash = deliver(payload);
    assert_eq!(splash.payload().map(Payload::len), Some(0));
}
