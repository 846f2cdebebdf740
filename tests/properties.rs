//! Property tests for applying parameter mappings.

use proptest::prelude::*;
use query_sync::{apply_query_params, ParamMap};
use url::Url;

fn mapping() -> impl Strategy<Value = ParamMap> {
    prop::collection::vec(
        ("[a-c]{1,2}", prop::collection::vec("[a-z0-9 &=]{0,4}", 0..3)),
        0..4,
    )
    .prop_map(|entries| {
        let mut map = ParamMap::new();
        for (key, values) in entries {
            map.insert(key, values);
        }
        map
    })
}

proptest! {
    #[test]
    fn apply_is_idempotent(start in mapping(), update in mapping(), remove_extras: bool) {
        let mut url = Url::parse("https://app.test/page").unwrap();
        url.set_query(Some(&start.to_query_string()));

        let once = apply_query_params(&url, &update, remove_extras);
        let twice = apply_query_params(&once, &update, remove_extras);
        prop_assert_eq!(once.as_str(), twice.as_str());
    }

    #[test]
    fn remove_extras_leaves_only_mapping(start in mapping(), update in mapping()) {
        let next = apply_query_params(&start, &update, true);
        for key in next.keys() {
            prop_assert!(update.contains_key(key));
        }
        for (key, values) in update.iter() {
            prop_assert_eq!(next.get(key), values);
        }
    }

    #[test]
    fn query_string_round_trips(map in mapping()) {
        let parsed = ParamMap::from_query(&map.to_query_string());
        for (key, values) in map.iter().filter(|(_, values)| !values.is_empty()) {
            prop_assert_eq!(parsed.get(key), values);
        }
    }
}
