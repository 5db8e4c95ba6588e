use serde_json::Value;

use crate::auth::UserProfile;

use super::{Query, SampleBody};

/// Placeholders a sample may carry.
const PROFILE_TOKENS: [&str; 4] = [
    "{user-id}",
    "{user-mail}",
    "{user-principal-name}",
    "{user-display-name}",
];

fn token_value<'a>(token: &str, profile: &'a UserProfile) -> Option<&'a str> {
    let value = match token {
        "{user-id}" => profile.id.as_str(),
        "{user-mail}" => profile.mail.as_deref()?,
        "{user-principal-name}" => profile.user_principal_name.as_str(),
        "{user-display-name}" => profile.display_name.as_str(),
        _ => return None,
    };
    if value.trim().is_empty() { None } else { Some(value) }
}

/// Replace known profile placeholders in `text`. Tokens without a profile
/// value are left untouched.
pub fn substitute(text: &str, profile: Option<&UserProfile>) -> String {
    let Some(profile) = profile else {
        return text.to_string();
    };

    let mut result = text.to_string();
    for token in PROFILE_TOKENS {
        if let Some(value) = token_value(token, profile) {
            result = result.replace(token, value);
        }
    }
    result
}

fn substitute_json(value: &mut Value, profile: Option<&UserProfile>) {
    match value {
        Value::String(text) => *text = substitute(text, profile),
        Value::Array(items) => items.iter_mut().for_each(|item| substitute_json(item, profile)),
        Value::Object(fields) => fields.values_mut().for_each(|field| substitute_json(field, profile)),
        _ => {}
    }
}

/// Substitute profile tokens in the URL and body of `query`. JSON bodies are
/// rewritten in their string values only.
pub fn substitute_tokens(query: &mut Query, profile: Option<&UserProfile>) {
    query.sample_url = substitute(&query.sample_url, profile);
    match &mut query.sample_body {
        Some(SampleBody::Raw(raw)) => *raw = substitute(raw, profile),
        Some(SampleBody::Json(json)) => substitute_json(json, profile),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: "48d31887-5fad-4d73-a9f5-3c356e68a038".into(),
            display_name: "Megan Bowen".into(),
            mail: Some("MeganB@contoso.com".into()),
            user_principal_name: "MeganB@contoso.com".into(),
        }
    }

    #[test]
    fn replaces_known_tokens() {
        let result = substitute("/v1.0/users/{user-id}/messages", Some(&profile()));
        assert_eq!(result, "/v1.0/users/48d31887-5fad-4d73-a9f5-3c356e68a038/messages");
    }

    #[test]
    fn leaves_unresolved_tokens() {
        let mut partial = profile();
        partial.mail = None;
        let result = substitute("/v1.0/users/{user-mail}/{site-id}", Some(&partial));
        assert_eq!(result, "/v1.0/users/{user-mail}/{site-id}");
    }

    #[test]
    fn without_profile_is_a_no_op() {
        assert_eq!(substitute("/v1.0/users/{user-id}", None), "/v1.0/users/{user-id}");
    }

    #[test]
    fn substitutes_url_and_raw_body_of_a_query() {
        let mut query = Query {
            sample_body: Some(SampleBody::Raw("owner={user-principal-name}".into())),
            ..Query::get("https://graph.microsoft.com/v1.0/users/{user-id}", "https://graph.microsoft.com")
        };
        substitute_tokens(&mut query, Some(&profile()));
        assert_eq!(
            query.sample_url,
            "https://graph.microsoft.com/v1.0/users/48d31887-5fad-4d73-a9f5-3c356e68a038"
        );
        assert_eq!(query.sample_body, Some(SampleBody::Raw("owner=MeganB@contoso.com".into())));
    }

    #[test]
    fn substitutes_string_values_of_a_json_body() {
        let mut query = Query {
            sample_body: Some(SampleBody::Json(serde_json::json!({
                "subject": "Sync with {user-display-name}",
                "attendees": [{ "emailAddress": { "address": "{user-mail}" } }],
                "isOnlineMeeting": true,
            }))),
            ..Query::get("https://graph.microsoft.com/v1.0/me/events", "https://graph.microsoft.com")
        };
        substitute_tokens(&mut query, Some(&profile()));
        assert_eq!(
            query.sample_body,
            Some(SampleBody::Json(serde_json::json!({
                "subject": "Sync with Megan Bowen",
                "attendees": [{ "emailAddress": { "address": "MeganB@contoso.com" } }],
                "isOnlineMeeting": true,
            })))
        );
    }
}
