use crate::{AllowedLocations, Location};

/// Builds the list shown to the user.
///
/// Fetched locations are filtered by the allowlist. Without an active search,
/// a permitted pinned default is moved to the front and any other occurrence
/// of it is dropped.
#[must_use]
pub fn reconcile(
    fetched: &[Location],
    allowed: &AllowedLocations,
    pinned_default: Option<&Location>,
    search_text: &str,
) -> Vec<Location> {
    let filtered = fetched
        .iter()
        .filter(|location| allowed.permits(location.id()));

    let pinned = pinned_default
        .filter(|_| search_text.trim().is_empty())
        .filter(|pinned| allowed.permits(pinned.id()));

    match pinned {
        Some(pinned) => std::iter::once(pinned)
            .chain(filtered.filter(|location| location.id() != pinned.id()))
            .cloned()
            .collect(),
        None => filtered.cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::reconcile;
    use crate::{AccessPolicy, AllowedLocations, Location, LocationId, facility};

    fn location(id: &str) -> Location {
        match LocationId::new(id) {
            Ok(location_id) => Location::new(location_id, format!("Location {id}")),
            Err(error) => panic!("invalid test location id '{id}': {error}"),
        }
    }

    fn allowed(ids: &[&str]) -> AllowedLocations {
        ids.iter().map(|id| location(id).id().clone()).collect()
    }

    fn ids(locations: &[Location]) -> Vec<&str> {
        locations.iter().map(|location| location.id().as_str()).collect()
    }

    #[test]
    fn laboratory_role_keeps_only_the_laboratory() {
        let allowlist = AccessPolicy::builtin().allowed_location_ids(["Access: Laboratory"]);
        let fetched = vec![
            location("ward-a"),
            location(facility::LABORATORY),
            location("ward-b"),
        ];

        let result = reconcile(&fetched, &allowlist, None, "");
        assert_eq!(ids(&result), vec![facility::LABORATORY]);
    }

    #[test]
    fn pinned_default_is_prepended_when_not_fetched() {
        let fetched = vec![location("a"), location("b")];
        let pinned = location("default");

        let result = reconcile(&fetched, &AllowedLocations::unrestricted(), Some(&pinned), "");
        assert_eq!(ids(&result), vec!["default", "a", "b"]);
    }

    #[test]
    fn pinned_default_is_moved_to_the_front_once() {
        let fetched = vec![location("a"), location("default"), location("b")];
        let pinned = location("default");

        let result = reconcile(&fetched, &AllowedLocations::unrestricted(), Some(&pinned), "");
        assert_eq!(ids(&result), vec!["default", "a", "b"]);
    }

    #[test]
    fn active_search_suppresses_the_pinned_default() {
        let fetched = vec![location("lab-1"), location("lab-2")];
        let pinned = location("default");

        let result = reconcile(
            &fetched,
            &AllowedLocations::unrestricted(),
            Some(&pinned),
            "lab",
        );
        assert_eq!(ids(&result), vec!["lab-1", "lab-2"]);
    }

    #[test]
    fn active_search_keeps_fetched_default_in_place() {
        let fetched = vec![location("lab-1"), location("default")];
        let pinned = location("default");

        let result = reconcile(
            &fetched,
            &AllowedLocations::unrestricted(),
            Some(&pinned),
            "lab",
        );
        assert_eq!(ids(&result), vec!["lab-1", "default"]);
    }

    #[test]
    fn forbidden_pinned_default_is_not_injected() {
        let fetched = vec![location("a"), location("b")];
        let pinned = location("default");

        let result = reconcile(&fetched, &allowed(&["a"]), Some(&pinned), "");
        assert_eq!(ids(&result), vec!["a"]);
    }

    #[test]
    fn allowed_pinned_default_is_injected_with_restriction() {
        let fetched = vec![location("a"), location("b")];
        let pinned = location("default");

        let result = reconcile(&fetched, &allowed(&["b", "default"]), Some(&pinned), "");
        assert_eq!(ids(&result), vec!["default", "b"]);
    }

    #[test]
    fn whitespace_search_counts_as_empty() {
        let fetched = vec![location("a")];
        let pinned = location("default");

        let result = reconcile(&fetched, &AllowedLocations::unrestricted(), Some(&pinned), "  ");
        assert_eq!(ids(&result), vec!["default", "a"]);
    }

    fn arb_ids() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-f]{1,2}", 0..12)
    }

    fn to_locations(ids: &[String]) -> Vec<Location> {
        ids.iter().map(|id| location(id)).collect()
    }

    proptest! {
        #[test]
        fn empty_allowlist_keeps_every_fetched_location(fetched in arb_ids()) {
            let fetched = to_locations(&fetched);
            let result = reconcile(&fetched, &AllowedLocations::unrestricted(), None, "");
            prop_assert_eq!(result, fetched);
        }

        #[test]
        fn restricted_output_only_contains_allowed_ids(
            fetched in arb_ids(),
            allowlist in prop::collection::vec("[a-f]{1,2}", 1..4),
            pinned in prop::option::of("[a-f]{1,2}"),
            search in prop::sample::select(vec!["", "ab"]),
        ) {
            let fetched = to_locations(&fetched);
            let allowlist: AllowedLocations =
                allowlist.iter().map(|id| location(id).id().clone()).collect();
            let pinned = pinned.as_deref().map(location);

            let result = reconcile(&fetched, &allowlist, pinned.as_ref(), search);
            for (index, entry) in result.iter().enumerate() {
                let is_pin = index == 0
                    && search.is_empty()
                    && pinned.as_ref().is_some_and(|pin| pin.id() == entry.id());
                prop_assert!(allowlist.permits(entry.id()) || is_pin);
            }
        }

        #[test]
        fn reconcile_is_deterministic(
            fetched in arb_ids(),
            allowlist in prop::collection::vec("[a-f]{1,2}", 0..4),
            pinned in prop::option::of("[a-f]{1,2}"),
        ) {
            let fetched = to_locations(&fetched);
            let allowlist: AllowedLocations =
                allowlist.iter().map(|id| location(id).id().clone()).collect();
            let pinned = pinned.as_deref().map(location);

            let first = reconcile(&fetched, &allowlist, pinned.as_ref(), "");
            let second = reconcile(&fetched, &allowlist, pinned.as_ref(), "");
            prop_assert_eq!(first, second);
        }

        #[test]
        fn permitted_pin_appears_exactly_once_and_first(
            fetched in arb_ids(),
            pinned in "[a-f]{1,2}",
        ) {
            let fetched = to_locations(&fetched);
            let pinned = location(&pinned);

            let result = reconcile(&fetched, &AllowedLocations::unrestricted(), Some(&pinned), "");
            prop_assert_eq!(result.first(), Some(&pinned));
            let occurrences = result.iter().filter(|entry| entry.id() == pinned.id()).count();
            prop_assert_eq!(occurrences, 1);
        }
    }
}
