mod support;

// self
use support::*;

fn refresh_token(value: &str) -> Token {
	Token::new(TokenKind::Refresh, value)
		.expect("Refresh token fixture should be valid.")
		.with_target_identity("72f988bf-86f1-41af-91ab-2d7cd011db47")
}

#[tokio::test]
async fn access_tokens_are_rejected_without_io() {
	let http = ScriptedHttpClient::default();
	let cache = MemoryCache::default();
	let authority = build_authority(&http, &cache, FakeUserAgent::new(Interaction::Pending));
	let access = Token::new(TokenKind::Access, "not-a-refresh-token")
		.expect("Access token fixture should be valid.");
	let err = authority
		.acquire_token_by_refresh_token(&target(), &access)
		.await
		.expect_err("Access tokens cannot be redeemed as refresh tokens.");

	assert!(matches!(
		err,
		Error::InvalidArgument(ArgumentError::NotARefreshToken { found: TokenKind::Access })
	));
	assert_eq!(http.calls(), 0);
	assert!(cache.is_empty());
}

#[tokio::test]
async fn refresh_issues_a_new_pair_and_caches_it_under_the_token_identity() {
	let http = ScriptedHttpClient::always(ok("renewed", Some("rotated")));
	let cache = MemoryCache::default();
	let authority = build_authority(&http, &cache, FakeUserAgent::new(Interaction::Pending));
	let pair = authority
		.acquire_token_by_refresh_token(&target(), &refresh_token("original"))
		.await
		.expect("Refresh should succeed.");

	assert_eq!(pair.access_token().value().expose(), "renewed");
	assert_eq!(pair.refresh_token().map(|token| token.value().expose()), Some("rotated"));

	let requests = http.requests();
	let request = requests.first().expect("One token request should be recorded.");

	assert_eq!(request.form.get("grant_type").map(String::as_str), Some("refresh_token"));
	assert_eq!(request.form.get("refresh_token").map(String::as_str), Some("original"));

	let cached = cache
		.get(&cache_key(Some("72f988bf-86f1-41af-91ab-2d7cd011db47")))
		.await
		.expect("Cache read should succeed.")
		.expect("Renewed pair should be cached under the token identity.");

	assert_eq!(cached, pair);
}

#[tokio::test]
async fn missing_rotation_carries_the_input_refresh_token_forward() {
	let http = ScriptedHttpClient::always(ok("renewed", None));
	let authority =
		build_authority(&http, &MemoryCache::default(), FakeUserAgent::new(Interaction::Pending));
	let input = refresh_token("long-lived");
	let pair = authority
		.acquire_token_by_refresh_token(&target(), &input)
		.await
		.expect("Refresh should succeed.");

	assert_eq!(pair.refresh_token(), Some(&input));
}

#[tokio::test]
async fn rejected_refresh_tokens_expire_and_invalidate_the_cache_entry() {
	let http = ScriptedHttpClient::always(oauth_error(
		400,
		"invalid_grant",
		70008,
		"The provided authorization code or refresh token has expired due to inactivity.",
	));
	let cache = MemoryCache::default();
	let authority = build_authority(&http, &cache, FakeUserAgent::new(Interaction::Pending));
	let key = cache_key(Some("72f988bf-86f1-41af-91ab-2d7cd011db47"));
	let expires_at = OffsetDateTime::now_utc() + Duration::hours(1);

	seed(&cache, key.clone(), pair_expiring_at("cached", Some("original"), expires_at)).await;

	let err = authority
		.acquire_token_by_refresh_token(&target(), &refresh_token("original"))
		.await
		.expect_err("Expired refresh token should fail.");

	assert!(matches!(err, Error::TokenExpired { .. }));
	assert!(cache.get(&key).await.expect("Cache read should succeed.").is_none());
	assert_eq!(http.calls(), 1);
}

#[tokio::test]
async fn other_denials_leave_the_cache_untouched() {
	let http = ScriptedHttpClient::always(oauth_error(
		400,
		"invalid_client",
		7000218,
		"The request body must contain the following parameter: 'client_assertion'.",
	));
	let cache = MemoryCache::default();
	let authority = build_authority(&http, &cache, FakeUserAgent::new(Interaction::Pending));
	let key = cache_key(Some("72f988bf-86f1-41af-91ab-2d7cd011db47"));
	let expires_at = OffsetDateTime::now_utc() + Duration::hours(1);

	seed(&cache, key.clone(), pair_expiring_at("cached", Some("original"), expires_at)).await;

	let err = authority
		.acquire_token_by_refresh_token(&target(), &refresh_token("original"))
		.await
		.expect_err("Client misconfiguration should fail.");

	assert!(matches!(err, Error::AuthenticationFailed { .. }));
	assert!(cache.get(&key).await.expect("Cache read should succeed.").is_some());
}

async fn interactive_pair(authority: &TestAuthority) -> TokenPair {
	authority
		.acquire_token_interactive(&target(), REDIRECT_URI, None, &CancellationToken::new())
		.await
		.expect("Interactive acquisition should succeed.")
}

#[tokio::test]
async fn rejected_refresh_tokens_also_leave_the_interactive_entry() {
	let http = ScriptedHttpClient::sequence([
		ok_with_id_token("interactive", "interactive-refresh"),
		oauth_error(
			400,
			"invalid_grant",
			70008,
			"The refresh token has expired due to inactivity.",
		),
	]);
	let cache = MemoryCache::default();
	let user_agent = FakeUserAgent::new(Interaction::EchoCode("auth-code".into()));
	let authority = build_authority(&http, &cache, user_agent);
	let pair = interactive_pair(&authority).await;
	let refresh = pair.refresh_token().expect("Interactive pair should carry a refresh token.");

	assert_eq!(refresh.target_identity(), Some(TENANT_ID));

	let err = authority
		.acquire_token_by_refresh_token(&target(), refresh)
		.await
		.expect_err("Expired refresh token should fail.");

	assert!(matches!(err, Error::TokenExpired { .. }));
	assert!(cache.get(&cache_key(None)).await.expect("Cache read should succeed.").is_none());
	assert!(cache.is_empty());
}

#[tokio::test]
async fn renewed_pairs_replace_the_interactive_entry_they_came_from() {
	let http = ScriptedHttpClient::sequence([
		ok_with_id_token("interactive", "interactive-refresh"),
		ok("renewed", Some("rotated")),
	]);
	let cache = MemoryCache::default();
	let user_agent = FakeUserAgent::new(Interaction::EchoCode("auth-code".into()));
	let authority = build_authority(&http, &cache, user_agent);
	let pair = interactive_pair(&authority).await;
	let refresh = pair.refresh_token().expect("Interactive pair should carry a refresh token.");
	let renewed = authority
		.acquire_token_by_refresh_token(&target(), refresh)
		.await
		.expect("Refresh should succeed.");

	for key in [cache_key(None), cache_key(Some(TENANT_ID))] {
		let cached = cache
			.get(&key)
			.await
			.expect("Cache read should succeed.")
			.expect("Renewed pair should be cached.");

		assert_eq!(cached, renewed);
	}
}

#[tokio::test]
async fn unrelated_interactive_entries_survive_a_rejected_refresh() {
	let http = ScriptedHttpClient::always(oauth_error(
		400,
		"invalid_grant",
		70008,
		"The refresh token has expired due to inactivity.",
	));
	let cache = MemoryCache::default();
	let authority = build_authority(&http, &cache, FakeUserAgent::new(Interaction::Pending));
	let expires_at = OffsetDateTime::now_utc() + Duration::hours(1);

	seed(&cache, cache_key(None), pair_expiring_at("other", Some("other-refresh"), expires_at))
		.await;

	let err = authority
		.acquire_token_by_refresh_token(&target(), &refresh_token("original"))
		.await
		.expect_err("Expired refresh token should fail.");

	assert!(matches!(err, Error::TokenExpired { .. }));
	assert!(cache.get(&cache_key(None)).await.expect("Cache read should succeed.").is_some());
}
