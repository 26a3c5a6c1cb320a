use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use guarded_portal::{
    AccessPolicy, AuthSession, Claims, ClaimsSource, DecodeError, NavigationTarget,
    UnverifiedDecoder, auth::claims_source_for, config::ClaimsMode, evaluate,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::SystemTime;

// --- Helper Functions ---

const ISSUER_SECRET: &str = "issuer-secret-the-guard-never-sees";

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn mint(payload: serde_json::Value) -> String {
    let key = EncodingKey::from_secret(ISSUER_SECRET.as_bytes());
    encode(&Header::default(), &payload, &key).unwrap()
}

/// Assembles a compact token from raw JSON parts, the way any issuer would,
/// with a signature segment the guard cannot check anyway.
fn forge(header: serde_json::Value, payload: serde_json::Value, signature: &str) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string()),
        signature
    )
}

fn token_for(role: &str) -> String {
    let iat = now();
    mint(json!({ "sub": "user-1", "role": role, "iat": iat, "exp": iat + 3600 }))
}

// --- UnverifiedDecoder ---

#[test]
fn test_decodes_role_and_metadata_without_secret() {
    let iat = now();
    let token = mint(json!({ "sub": "user-42", "role": "editor", "iat": iat, "exp": iat + 60 }));

    let claims = UnverifiedDecoder::new().decode(&token).unwrap();

    assert_eq!(claims.role, "editor");
    assert_eq!(claims.sub.as_deref(), Some("user-42"));
    assert_eq!(claims.iat, Some(iat as f64));
    assert_eq!(claims.exp, Some((iat + 60) as f64));
}

#[test]
fn test_expired_token_still_decodes() {
    // Expiry is metadata only at this layer.
    let token = mint(json!({ "role": "admin", "iat": 1_000, "exp": 2_000 }));

    let claims = UnverifiedDecoder::new().decode(&token).unwrap();
    assert_eq!(claims.role, "admin");
}

#[test]
fn test_minimal_payload_decodes() {
    let token = mint(json!({ "role": "viewer" }));

    let claims = UnverifiedDecoder::new().decode(&token).unwrap();
    assert_eq!(claims, Claims::with_role("viewer"));
}

#[test]
fn test_payload_without_role_is_malformed() {
    let token = mint(json!({ "sub": "user-1", "exp": now() + 60 }));

    let result = UnverifiedDecoder::new().decode(&token);
    assert!(matches!(result, Err(DecodeError::Malformed(_))));
}

#[test]
fn test_garbage_is_malformed() {
    let decoder = UnverifiedDecoder::new();
    for token in ["", "not-a-jwt", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.!!!.sig"] {
        assert!(
            matches!(decoder.decode(token), Err(DecodeError::Malformed(_))),
            "token {token:?}"
        );
    }
}

#[test]
fn test_decodes_asymmetric_and_unsigned_algorithms() {
    let decoder = UnverifiedDecoder::new();
    let policy = AccessPolicy::roles(["admin"]);
    let payload = json!({ "sub": "user-9", "role": "admin", "exp": now() + 60 });

    let tokens = [
        forge(json!({ "alg": "RS256", "typ": "JWT", "kid": "k1" }), payload.clone(), "c2lnbmF0dXJl"),
        forge(json!({ "alg": "ES256", "typ": "JWT" }), payload.clone(), "c2lnbmF0dXJl"),
        forge(json!({ "alg": "PS256" }), payload.clone(), "c2lnbmF0dXJl"),
        forge(json!({ "alg": "EdDSA" }), payload.clone(), "c2lnbmF0dXJl"),
        forge(json!({ "alg": "none" }), payload.clone(), ""),
    ];

    for token in &tokens {
        let claims = decoder.decode(token).unwrap();
        assert_eq!(claims.role, "admin", "token {token}");
        assert_eq!(
            evaluate(Some(token.as_str()), &decoder, Some(&policy), "/admin".into()),
            NavigationTarget::RenderContent,
            "token {token}"
        );
    }
}

#[test]
fn test_padded_segments_decode() {
    let header = base64::engine::general_purpose::URL_SAFE.encode(r#"{"alg":"RS256"}"#);
    let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"role":"viewer"}"#);
    let token = format!("{header}.{payload}.sig");

    let claims = UnverifiedDecoder::new().decode(&token).unwrap();
    assert_eq!(claims.role, "viewer");
}

#[test]
fn test_wrong_segment_count_is_malformed() {
    let decoder = UnverifiedDecoder::new();
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
    let payload = URL_SAFE_NO_PAD.encode(r#"{"role":"admin"}"#);

    for token in [
        format!("{header}.{payload}"),
        format!("{header}.{payload}.sig.extra"),
    ] {
        assert!(
            matches!(decoder.decode(&token), Err(DecodeError::Malformed(_))),
            "token {token:?}"
        );
    }
}

#[test]
fn test_non_object_header_is_malformed() {
    let token = forge(json!(["RS256"]), json!({ "role": "admin" }), "sig");

    let result = UnverifiedDecoder::new().decode(&token);
    assert!(matches!(result, Err(DecodeError::Malformed(_))));
}

#[test]
fn test_fractional_numeric_dates_decode() {
    let token = forge(
        json!({ "alg": "RS256" }),
        json!({ "role": "editor", "iat": 1700000000.5, "exp": 1700003600.25 }),
        "sig",
    );

    let claims = UnverifiedDecoder::new().decode(&token).unwrap();
    assert_eq!(claims.role, "editor");
    assert_eq!(claims.iat, Some(1700000000.5));
    assert_eq!(claims.exp, Some(1700003600.25));

    let policy = AccessPolicy::roles(["editor"]);
    assert_eq!(
        evaluate(Some(token.as_str()), &UnverifiedDecoder::new(), Some(&policy), "/editor".into()),
        NavigationTarget::RenderContent
    );
}

#[test]
fn test_numeric_subject_decodes_as_text() {
    let token = forge(json!({ "alg": "HS256" }), json!({ "role": "viewer", "sub": 42 }), "sig");

    let claims = UnverifiedDecoder::new().decode(&token).unwrap();
    assert_eq!(claims.role, "viewer");
    assert_eq!(claims.sub.as_deref(), Some("42"));
}

#[test]
fn test_odd_metadata_shapes_are_dropped() {
    let token = forge(
        json!({ "alg": "HS256" }),
        json!({ "role": "admin", "sub": { "id": 1 }, "iat": "1700000000", "exp": null }),
        "sig",
    );

    let claims = UnverifiedDecoder::new().decode(&token).unwrap();
    assert_eq!(claims.role, "admin");
    assert_eq!(claims.sub, None);
    assert_eq!(claims.iat, Some(1_700_000_000.0));
    assert_eq!(claims.exp, None);
}

#[test]
fn test_guard_with_real_tokens() {
    let decoder = UnverifiedDecoder::new();
    let policy = AccessPolicy::roles(["admin", "editor"]);

    let admin = token_for("admin");
    let viewer = token_for("viewer");

    assert_eq!(
        evaluate(Some(admin.as_str()), &decoder, Some(&policy), "/editor".into()),
        NavigationTarget::RenderContent
    );
    assert_eq!(
        evaluate(Some(viewer.as_str()), &decoder, Some(&policy), "/editor".into()),
        NavigationTarget::RedirectHome
    );
    assert_eq!(
        evaluate(Some(viewer.as_str()), &decoder, None, "/dashboard".into()),
        NavigationTarget::RenderContent
    );
    assert_eq!(
        evaluate(Some("garbage"), &decoder, None, "/dashboard".into()),
        NavigationTarget::RedirectLogin {
            remember: "/dashboard".into()
        }
    );
}

// --- AuthSession ---

fn counting_decoder(calls: Arc<AtomicUsize>) -> impl ClaimsSource {
    let inner = UnverifiedDecoder::new();
    move |token: &str| {
        calls.fetch_add(1, Ordering::SeqCst);
        inner.decode(token)
    }
}

#[test]
fn test_session_decodes_each_token_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let session = AuthSession::new(counting_decoder(calls.clone()));
    let token = token_for("admin");

    for _ in 0..3 {
        assert_eq!(session.decode(&token).unwrap().role, "admin");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.current().map(|c| c.role).as_deref(), Some("admin"));

    // A different token is observed afresh.
    let other = token_for("viewer");
    assert_eq!(session.decode(&other).unwrap().role, "viewer");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_session_forgets_on_failure_and_sign_out() {
    let session = AuthSession::new(UnverifiedDecoder::new());
    let token = token_for("editor");

    session.decode(&token).unwrap();
    assert!(session.current().is_some());

    assert!(session.decode("garbage").is_err());
    assert!(session.current().is_none());

    session.decode(&token).unwrap();
    session.sign_out();
    assert!(session.current().is_none());
}

#[test]
fn test_session_and_direct_decode_agree() {
    let direct = UnverifiedDecoder::new();
    let session = AuthSession::new(UnverifiedDecoder::new());
    let policies = [
        None,
        Some(AccessPolicy::roles(["admin"])),
        Some(AccessPolicy::roles(["admin", "editor"])),
    ];
    let tokens = [
        None,
        Some("garbage".to_string()),
        Some(token_for("admin")),
        Some(token_for("editor")),
        Some(token_for("viewer")),
    ];

    for policy in &policies {
        for token in &tokens {
            let location = "/somewhere";
            let a = evaluate(token.as_deref(), &direct, policy.as_ref(), location.into());
            let b = evaluate(token.as_deref(), &session, policy.as_ref(), location.into());
            assert_eq!(a, b, "token {token:?} policy {policy:?}");
        }
    }
}

// --- Configured claims source ---

#[test]
fn test_configured_sources_decode_alike() {
    let token = token_for("editor");

    for mode in [ClaimsMode::Direct, ClaimsMode::Session] {
        let source = claims_source_for(&mode);
        assert_eq!(source.decode(&token).unwrap().role, "editor", "mode {mode:?}");
        // Second call exercises the session cache.
        assert_eq!(source.decode(&token).unwrap().role, "editor", "mode {mode:?}");
        assert!(source.decode("garbage").is_err(), "mode {mode:?}");
    }
}
