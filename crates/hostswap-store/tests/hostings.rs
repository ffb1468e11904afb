use chrono::NaiveDate;
use hostswap_core::domain::{
    CountryCode, DistanceUnit, Environment, GeoPoint, GeoResult, GeocodeError, Geocoder, Hosting,
    HostingDraft, User, Visit, VisitDraft,
};
use hostswap_core::rules::{ErrorKind, Field, MatchPolicy};
use hostswap_core::CoreError;
use hostswap_store::error::StoreError;
use hostswap_store::repo::{UserNew, VisitRules};
use hostswap_store::Store;

const MADRID: (f64, f64) = (40.4169, -3.7035);
const ALCALA: (f64, f64) = (40.4818, -3.3643);
const TOLEDO: (f64, f64) = (39.8628, -4.0273);
const BARCELONA: (f64, f64) = (41.3874, 2.1686);

struct MadridOnly;

impl Geocoder for MadridOnly {
    fn backend_name(&self) -> &'static str {
        "madrid-only"
    }

    fn geocode(&self, zipcode: &str) -> Result<Vec<GeoResult>, GeocodeError> {
        if zipcode == "28013" {
            Ok(vec![GeoResult {
                city: Some("Madrid".to_string()),
                state: None,
                latitude: MADRID.0,
                longitude: MADRID.1,
            }])
        } else {
            Ok(Vec::new())
        }
    }
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, month, day).expect("valid date")
}

fn store() -> Store {
    let store = Store::open_in_memory().expect("open store");
    store.migrate().expect("migrate");
    store
}

fn user(store: &Store, uid: &str) -> User {
    store
        .users()
        .create(
            1,
            UserNew {
                uid: uid.to_string(),
                ..Default::default()
            },
        )
        .expect("create user")
}

fn visit(store: &Store, owner: &User) -> Visit {
    store
        .visits()
        .create(
            2,
            VisitDraft {
                user_id: owner.id,
                start_date: Some(date(3, 1)),
                end_date: Some(date(3, 5)),
                zipcode: Some("28013".to_string()),
            },
            &VisitRules {
                today: date(1, 1),
                country: CountryCode::Es,
            },
            &MadridOnly,
        )
        .expect("create visit")
}

fn hosting(
    store: &Store,
    host: &User,
    title: &str,
    at: (f64, f64),
    start: NaiveDate,
    end: NaiveDate,
) -> Hosting {
    store
        .hostings()
        .create(
            3,
            HostingDraft {
                host_id: host.id,
                title: title.to_string(),
                zipcode: None,
                start_date: Some(start),
                end_date: Some(end),
                location: Some(GeoPoint::new(at.0, at.1)),
            },
            CountryCode::Es,
            &MadridOnly,
        )
        .expect("create hosting")
}

fn titles(matches: &[hostswap_core::rules::HostingMatch]) -> Vec<&str> {
    matches
        .iter()
        .map(|found| found.hosting.title.as_str())
        .collect()
}

#[test]
fn available_hostings_are_near_overlapping_and_sorted() {
    let store = store();
    let guest = user(&store, "guest");
    let host = user(&store, "host");
    let visit = visit(&store, &guest);

    hosting(&store, &host, "toledo", TOLEDO, date(3, 1), date(3, 31));
    hosting(&store, &host, "alcala", ALCALA, date(2, 20), date(3, 1));
    hosting(&store, &host, "barcelona", BARCELONA, date(3, 1), date(3, 31));
    hosting(&store, &host, "alcala-later", ALCALA, date(3, 6), date(3, 10));

    let policy = MatchPolicy::for_environment(Environment::Production);
    let matches = store
        .hostings()
        .available_for_visit(&visit, guest.id, &policy)
        .expect("available");

    assert_eq!(titles(&matches), vec!["alcala", "toledo"]);
    assert!(matches[0].distance < matches[1].distance);
    assert!(matches[1].distance <= policy.radius);
}

#[test]
fn own_hostings_are_excluded_only_in_production() {
    let store = store();
    let guest = user(&store, "guest");
    let visit = visit(&store, &guest);
    hosting(&store, &guest, "my flat", ALCALA, date(3, 1), date(3, 31));

    let production = MatchPolicy::for_environment(Environment::Production);
    assert!(store
        .hostings()
        .available_for_visit(&visit, guest.id, &production)
        .expect("production")
        .is_empty());

    let development = MatchPolicy::for_environment(Environment::Development);
    let matches = store
        .hostings()
        .available_for_visit(&visit, guest.id, &development)
        .expect("development");
    assert_eq!(titles(&matches), vec!["my flat"]);
}

#[test]
fn radius_and_unit_come_from_the_policy() {
    let store = store();
    let guest = user(&store, "guest");
    let host = user(&store, "host");
    let visit = visit(&store, &guest);
    hosting(&store, &host, "toledo", TOLEDO, date(3, 1), date(3, 31));

    let policy = MatchPolicy::new(50.0, DistanceUnit::Miles, Environment::Production)
        .expect("policy");
    let matches = store
        .hostings()
        .available_for_visit(&visit, guest.id, &policy)
        .expect("available");
    assert_eq!(matches.len(), 1);
    assert!(matches[0].distance < 50.0);

    let tight = MatchPolicy::new(20.0, DistanceUnit::Kilometers, Environment::Production)
        .expect("policy");
    assert!(store
        .hostings()
        .available_for_visit(&visit, guest.id, &tight)
        .expect("available")
        .is_empty());
}

#[test]
fn other_users_cannot_query_a_visit() {
    let store = store();
    let guest = user(&store, "guest");
    let stranger = user(&store, "stranger");
    let visit = visit(&store, &guest);

    let err = store
        .hostings()
        .available_for_visit(&visit, stranger.id, &MatchPolicy::default())
        .expect_err("not owner");
    assert!(matches!(err, StoreError::Core(CoreError::NotOwner)));
}

#[test]
fn visit_without_coordinates_matches_nothing() {
    let store = store();
    let guest = user(&store, "guest");
    let host = user(&store, "host");
    let mut visit = visit(&store, &guest);
    hosting(&store, &host, "alcala", ALCALA, date(3, 1), date(3, 31));

    visit.latitude = None;
    visit.longitude = None;
    assert!(store
        .hostings()
        .available_for_visit(&visit, guest.id, &MatchPolicy::default())
        .expect("available")
        .is_empty());
}

#[test]
fn hosting_zipcode_is_geocoded_when_no_location_given() {
    let store = store();
    let host = user(&store, "host");
    let draft = HostingDraft {
        host_id: host.id,
        title: "Centro".to_string(),
        zipcode: Some("28013".to_string()),
        start_date: Some(date(4, 1)),
        end_date: Some(date(4, 30)),
        location: None,
    };

    let created = store
        .hostings()
        .create(5, draft.clone(), CountryCode::Es, &MadridOnly)
        .expect("create hosting");
    assert_eq!(created.city.as_deref(), Some("Madrid"));
    assert_eq!(created.coordinates(), GeoPoint::new(MADRID.0, MADRID.1));
    assert_eq!(
        store.hostings().get(created.id).expect("get"),
        Some(created.clone())
    );

    let err = store
        .hostings()
        .create(
            5,
            HostingDraft {
                zipcode: Some("41001".to_string()),
                ..draft.clone()
            },
            CountryCode::Es,
            &MadridOnly,
        )
        .expect_err("unknown zip");
    assert!(err
        .validation_errors()
        .expect("validation errors")
        .has(ErrorKind::UnknownZipCode));

    let err = store
        .hostings()
        .create(
            5,
            HostingDraft {
                title: " ".to_string(),
                zipcode: Some("nope".to_string()),
                ..draft
            },
            CountryCode::Es,
            &MadridOnly,
        )
        .expect_err("invalid draft");
    let errors = err.validation_errors().expect("validation errors");
    assert!(errors.has_on(Field::Title, ErrorKind::Blank));
    assert!(errors.has_on(Field::Zipcode, ErrorKind::Invalid));
}

#[test]
fn nearby_lists_within_radius_closest_first() {
    let store = store();
    let host = user(&store, "host");
    hosting(&store, &host, "toledo", TOLEDO, date(3, 1), date(3, 31));
    hosting(&store, &host, "alcala", ALCALA, date(6, 1), date(6, 30));
    hosting(&store, &host, "barcelona", BARCELONA, date(3, 1), date(3, 31));

    let origin = GeoPoint::new(MADRID.0, MADRID.1);
    let all = store
        .hostings()
        .nearby(origin, 100.0, DistanceUnit::Kilometers, None)
        .expect("nearby");
    assert_eq!(titles(&all), vec!["alcala", "toledo"]);

    let march = store
        .hostings()
        .nearby(
            origin,
            100.0,
            DistanceUnit::Kilometers,
            Some((date(3, 10), date(3, 12))),
        )
        .expect("nearby in march");
    assert_eq!(titles(&march), vec!["toledo"]);
}

#[test]
fn nearby_finds_hostings_across_the_antimeridian() {
    let store = store();
    let host = user(&store, "host");
    hosting(&store, &host, "east", (-17.0, -179.9), date(3, 1), date(3, 31));
    hosting(&store, &host, "west", (-17.0, 179.8), date(3, 1), date(3, 31));
    hosting(&store, &host, "far", (-17.0, 170.0), date(3, 1), date(3, 31));

    let found = store
        .hostings()
        .nearby(
            GeoPoint::new(-17.0, 179.9),
            75.0,
            DistanceUnit::Kilometers,
            None,
        )
        .expect("nearby");
    assert_eq!(titles(&found), vec!["west", "east"]);
    assert!(found[1].distance < 25.0, "got {}", found[1].distance);
}

#[test]
fn list_and_delete_hostings() {
    let store = store();
    let host = user(&store, "host");
    let other = user(&store, "other");
    let first = hosting(&store, &host, "first", ALCALA, date(3, 1), date(3, 2));
    hosting(&store, &other, "second", TOLEDO, date(4, 1), date(4, 2));

    assert_eq!(store.hostings().list(None).expect("list").len(), 2);
    let mine = store.hostings().list(Some(host.id)).expect("list mine");
    assert_eq!(mine, vec![first.clone()]);

    store.hostings().delete(first.id).expect("delete");
    assert!(store.hostings().get(first.id).expect("get").is_none());
    assert!(matches!(
        store.hostings().delete(first.id),
        Err(StoreError::NotFound(_))
    ));
}
