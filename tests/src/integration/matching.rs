//! # Interest Matching Flows
//!
//! Factories, the matching predicate and the wire codec used together the
//! way a client does: build an Interest, put it on the wire, decode it on
//! the other side and test content against it.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ccn_01_interest_matching::{
        AnswerOriginKind, ContentObject, ExactKeyTrustManager, ExcludeElement, ExcludeFilter,
        Interest, InterestMatcher, InterestMatchingApi, Name, OrderPreference, PublisherId,
        PublisherKind, PublisherPublicKeyDigest, TrustManager, WireEncodable,
    };

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    fn key(byte: u8) -> PublisherPublicKeyDigest {
        PublisherPublicKeyDigest([byte; 32])
    }

    /// Trust manager that accepts any certificate-based role
    struct AcceptCertificates;

    impl TrustManager for AcceptCertificates {
        fn matches_role(&self, required: &PublisherId, _: &PublisherPublicKeyDigest) -> bool {
            required.kind == PublisherKind::Certificate
        }
    }

    #[test]
    fn test_next_sets_leftmost_name_order_and_parent_prefix() {
        crate::init_tracing();
        let interest = Interest::next(name("/a/b"));
        assert_eq!(
            interest.order_preference,
            Some(OrderPreference::LEFT | OrderPreference::ORDER_NAME)
        );
        assert_eq!(interest.order_preference.map(|o| o.bits()), Some(4));
        assert_eq!(interest.name_component_count, Some(1));
    }

    #[test]
    fn test_digest_component_scenario() {
        crate::init_tracing();
        let matcher = InterestMatcher::default();
        let content = ContentObject::unsigned(name("/a/b"), b"body".to_vec());

        let open = Interest::new(name("/a/b"));
        assert!(matcher.matches_content(&open, &content));

        let exact = Interest::new(name("/a/b")).additional_name_components(0);
        assert!(!matcher.matches_content(&exact, &content));
    }

    #[test]
    fn test_decoded_interest_matches_the_same_content() {
        crate::init_tracing();
        let matcher = InterestMatcher::default();
        let filter = ExcludeFilter::new(vec![
            ExcludeElement::Component(b"v1".to_vec()),
            ExcludeElement::Component(b"v3".to_vec()),
        ])
        .unwrap();
        let interest = Interest::last_with_filter(name("/parc/doc/v0"), filter)
            .publisher_id(PublisherId::exact(&key(4)))
            .answer_origin_kind(AnswerOriginKind::CONTENT_STORE)
            .scope(1)
            .nonce(vec![9, 9, 9]);

        let wire = interest.encode().unwrap();
        let decoded = Interest::decode(&wire).unwrap();
        assert_eq!(decoded, interest);

        let candidates = [
            (ContentObject::new(name("/parc/doc/v2"), Some(key(4)), b"2".to_vec()), true),
            (ContentObject::new(name("/parc/doc/v3"), Some(key(4)), b"3".to_vec()), false),
            (ContentObject::new(name("/parc/doc/v2"), Some(key(5)), b"2".to_vec()), false),
            (ContentObject::new(name("/parc/img/v2"), Some(key(4)), b"2".to_vec()), false),
        ];
        for (content, expected) in candidates {
            assert_eq!(matcher.matches_content(&interest, &content), expected);
            assert_eq!(matcher.matches_content(&decoded, &content), expected);
        }
    }

    #[test]
    fn test_satisfied_interests_picks_every_matching_pending_interest() {
        crate::init_tracing();
        let matcher = InterestMatcher::default();
        let pending = vec![
            Interest::new(name("/news")),
            Interest::next(name("/news/2024/a")),
            Interest::new(name("/sports")),
            Interest::exclude(name("/news/2024"), &[b"b".to_vec()]).unwrap(),
        ];
        let content = ContentObject::unsigned(name("/news/2024/b"), b"x".to_vec());

        let satisfied = matcher.satisfied_interests(&content, &pending);
        assert_eq!(satisfied, vec![&pending[0], &pending[1]]);
    }

    #[test]
    fn test_trust_manager_is_injected() {
        crate::init_tracing();
        let content = ContentObject::new(name("/a/b"), Some(key(1)), b"x".to_vec());
        let interest = Interest::new(name("/a"))
            .publisher_id(PublisherId::new(PublisherKind::Certificate, [7; 32]));

        let exact = InterestMatcher::new(Arc::new(ExactKeyTrustManager));
        assert!(!exact.matches_content(&interest, &content));

        let custom = InterestMatcher::new(Arc::new(AcceptCertificates));
        assert!(custom.matches_content(&interest, &content));
    }

    #[test]
    fn test_next_after_content_skips_the_content_itself() {
        crate::init_tracing();
        let matcher = InterestMatcher::default();
        let first = ContentObject::unsigned(name("/log/1"), b"1".to_vec());
        let second = ContentObject::unsigned(name("/log/2"), b"2".to_vec());

        let interest = Interest::next_after_content(&first, None);
        assert_eq!(interest.name_component_count, Some(1));
        assert!(!matcher.matches_content(&interest, &first));
        assert!(matcher.matches_content(&interest, &second));
    }
}
