//! # Matching Properties
//!
//! - Prefix tests agree with component-wise comparison
//! - Each declared constraint can independently reject a match
//! - Exclude filters are exact set membership, independent of input order

#[cfg(test)]
mod tests {
    use ccn_01_interest_matching::{
        ContentObject, ExcludeFilter, Interest, InterestMatcher, InterestMatchingApi, Name,
        OrderPreference, PublisherId, PublisherPublicKeyDigest,
    };
    use proptest::prelude::*;

    fn component() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 1..6)
    }

    fn components(max: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
        prop::collection::vec(component(), 0..max)
    }

    proptest! {
        #[test]
        fn prop_prefix_of_extension(base in components(5), tail in components(4), k in 0usize..10) {
            let short = Name::new(base.clone());
            let mut extended = base.clone();
            extended.extend(tail);
            let long = Name::new(extended);

            let expected = k <= short.count();
            prop_assert_eq!(short.is_prefix_of(&long, k), expected);
        }

        #[test]
        fn prop_prefix_fails_beyond_either_length(a in components(5), b in components(5)) {
            let a = Name::new(a);
            let b = Name::new(b);
            let beyond = a.count().min(b.count()) + 1;
            prop_assert!(!a.is_prefix_of(&b, beyond));
            prop_assert!(!b.is_prefix_of(&a, beyond));
        }

        #[test]
        fn prop_exclude_is_set_membership(
            members in prop::collection::btree_set(component(), 1..12),
            candidate in component(),
            seed in any::<u64>(),
        ) {
            let mut shuffled: Vec<Vec<u8>> = members.iter().cloned().collect();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            let filter = ExcludeFilter::from_components(shuffled).unwrap();
            let sorted = ExcludeFilter::from_components(members.iter().cloned().collect()).unwrap();

            prop_assert_eq!(&filter, &sorted);
            for member in &members {
                prop_assert!(filter.exclude(member));
            }
            prop_assert_eq!(filter.exclude(&candidate), members.contains(&candidate));
        }

        #[test]
        fn prop_each_constraint_rejects_alone(
            prefix in prop::collection::vec(component(), 1..4),
            next in component(),
            key in any::<[u8; 32]>(),
            wrong_key in any::<[u8; 32]>(),
        ) {
            prop_assume!(key != wrong_key);
            let matcher = InterestMatcher::default();
            let base = Name::new(prefix);
            let publisher = PublisherPublicKeyDigest(key);

            let candidate = ContentObject::new(base.append(next.clone()), Some(publisher), b"x".to_vec());
            let open = Interest::new(base.clone());
            prop_assert!(matcher.matches_content(&open, &candidate));

            let by_exclude = open
                .clone()
                .exclude_filter(ExcludeFilter::from_components(vec![next.clone()]).unwrap());
            prop_assert!(!matcher.matches_content(&by_exclude, &candidate));

            let by_publisher = open.clone().publisher_id(PublisherId::exact(&PublisherPublicKeyDigest(wrong_key)));
            prop_assert!(!matcher.matches_content(&by_publisher, &candidate));
            let right_publisher = open.clone().publisher_id(PublisherId::exact(&publisher));
            prop_assert!(matcher.matches_content(&right_publisher, &candidate));

            let by_count = open.clone().additional_name_components(3);
            prop_assert!(!matcher.matches_content(&by_count, &candidate));

            let by_order = Interest::new(base.append(next))
                .name_component_count(base.count())
                .order_preference(OrderPreference::LEFT | OrderPreference::ORDER_NAME);
            prop_assert!(!matcher.matches_content(&by_order, &candidate));
        }
    }
}
