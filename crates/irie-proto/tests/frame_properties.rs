//! Property-based tests for the wire codec.
//!
//! The decoder faces a network peer, so the bar is: arbitrary input never
//! panics, and everything we encode is accepted by our own decoder with the
//! same meaning.

use irie_proto::{MessageId, Outbound, UserId, decode_frame, decode_payload, encode_frame};
use proptest::prelude::*;

fn arb_user_id() -> impl Strategy<Value = UserId> {
    (0i64..100_000).prop_map(UserId)
}

fn arb_outbound() -> impl Strategy<Value = Outbound> {
    prop_oneof![
        (arb_user_id(), ".{0,200}").prop_map(|(recipient_id, content)| Outbound::Message {
            recipient_id,
            content,
        }),
        (arb_user_id(), 1u32..10_000).prop_map(|(user, page)| Outbound::FetchHistory {
            user,
            page,
        }),
    ]
}

fn arb_message_id() -> impl Strategy<Value = MessageId> {
    prop_oneof![any::<i64>().prop_map(MessageId::Server), any::<u64>().prop_map(MessageId::Local)]
}

proptest! {
    #[test]
    fn decoder_never_panics(payload in ".{0,400}") {
        // Result content is irrelevant; absence of a panic is the property.
        let _ = decode_payload(&payload);
    }

    #[test]
    fn decoder_never_panics_on_json_shapes(
        action in "[a-z_]{0,20}",
        field in "[a-z]{1,10}",
        value in any::<i64>(),
    ) {
        let raw = format!(r#"{{"action":"{action}","{field}":{value}}}"#);
        let _ = decode_frame(&raw);
    }

    #[test]
    fn encoded_outbound_is_self_describing(frame in arb_outbound()) {
        let text = encode_frame(&frame).unwrap();
        // One frame per line is the transport contract.
        prop_assert!(!text.contains('\n'));
        let back: Outbound = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(back, frame);
    }

    #[test]
    fn message_id_order_is_total_and_server_first(
        a in arb_message_id(),
        b in arb_message_id(),
        c in arb_message_id(),
    ) {
        // Antisymmetry
        if a <= b && b <= a {
            prop_assert_eq!(a, b);
        }
        // Transitivity
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
        // Server ids always precede local ids
        if let (MessageId::Server(_), MessageId::Local(_)) = (a, b) {
            prop_assert!(a < b);
        }
    }

    #[test]
    fn sql_timestamps_always_parse(
        y in 1970i32..2100,
        mo in 1u32..=12,
        d in 1u32..=28,
        h in 0u32..24,
        mi in 0u32..60,
        s in 0u32..60,
    ) {
        let raw = format!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}");
        prop_assert!(irie_proto::timestamp::parse(&raw).is_ok());
    }
}
