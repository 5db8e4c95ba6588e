//! Application state and the reducer that updates it.
//!
//! Every change goes through [`reduce`], which is free of I/O: the UI layer
//! turns user input and finished futures into [`Action`]s and starts any
//! follow-up work itself.

use std::fmt::{self, Display};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::auth::{AuthToken, UserProfile};
use crate::collections::{ResourceCollection, ResourceLink};
use crate::copilot::CopilotError;
use crate::groups::{generate_groups, Group};
use crate::http::method::HttpMethod;
use crate::http::response::HttpResponse;
use crate::permissions::{
    search_permissions, set_consented_status, Permission, PermissionFetchError, PermissionsView,
};
use crate::query::{sample, Query};
use crate::samples::{search, should_run_query, SampleCatalog, SampleQuery};
use crate::status::{query_from_link, MessageType, Status, StatusValue};

const CACHED_SAMPLES_NOTICE: &str =
    "You are viewing a cached set of samples because of a network connection failure.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
    HighContrast,
}

impl ThemeChoice {
    pub const ALL: [ThemeChoice; 3] = [ThemeChoice::Dark, ThemeChoice::Light, ThemeChoice::HighContrast];

    pub fn key(self) -> &'static str {
        match self {
            ThemeChoice::Dark => "dark",
            ThemeChoice::Light => "light",
            ThemeChoice::HighContrast => "high-contrast",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ThemeChoice::ALL.into_iter().find(|theme| theme.key() == key)
    }
}

impl Display for ThemeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThemeChoice::Dark => "Dark",
            ThemeChoice::Light => "Light",
            ThemeChoice::HighContrast => "High contrast",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct SamplesState {
    pub catalog: Vec<SampleQuery>,
    pub cached: bool,
    pub loading: bool,
    pub keyword: String,
    pub visible: Vec<SampleQuery>,
    pub groups: Vec<Group>,
    pub selected: Option<usize>,
}

impl SamplesState {
    fn refresh(&mut self) {
        self.visible = search(&self.catalog, &self.keyword);
        self.selected = None;
        self.groups = match generate_groups(&self.visible, |query| query.category.as_str()) {
            Ok(groups) => groups,
            Err(err) => {
                warn!(error = %err, "sample catalog is not sorted by category");
                Vec::new()
            }
        };
    }
}

#[derive(Debug, Clone, Default)]
pub struct PermissionsState {
    pub scopes: Vec<Permission>,
    pub scopes_error: Option<PermissionFetchError>,
    pub loading_scopes: bool,
    pub full: Vec<Permission>,
    pub full_error: Option<PermissionFetchError>,
    pub keyword: String,
}

#[derive(Debug, Clone, Default)]
pub struct CopilotState {
    pub text: String,
    pub in_flight: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub graph_url: String,
    pub query: Query,
    pub samples: SamplesState,
    pub token: Option<AuthToken>,
    pub profile: Option<UserProfile>,
    pub permissions: PermissionsState,
    pub status: Option<Status>,
    pub response: Option<HttpResponse>,
    pub running: bool,
    pub copilot: CopilotState,
    pub collection: ResourceCollection,
    pub theme: ThemeChoice,
}

#[derive(Debug, Clone)]
pub enum Action {
    SamplesRequested,
    SamplesLoaded(SampleCatalog),
    SampleSearchChanged(String),
    SampleSelected(usize),
    QueryReplaced(Query),
    MethodChanged(HttpMethod),
    UrlChanged(String),
    SignedIn(AuthToken),
    SignedOut,
    ProfileLoaded(Result<UserProfile, String>),
    ScopesRequested,
    ScopesLoaded(Result<Vec<Permission>, PermissionFetchError>),
    FullPermissionsLoaded(Result<Vec<Permission>, PermissionFetchError>),
    PermissionSearchChanged(String),
    RequestStarted,
    RequestFinished(Result<HttpResponse, String>),
    CopilotTextChanged(String),
    CopilotStarted(String),
    CopilotFinished {
        request_id: String,
        result: Result<Query, CopilotError>,
    },
    StatusLinkActivated(String),
    StatusShown(Status),
    StatusDismissed,
    QueryAddedToCollection,
    CollectionPathRemoved(ResourceLink),
    CollectionExported(Result<PathBuf, String>),
    ThemeChanged(ThemeChoice),
}

impl AppState {
    pub fn new(graph_url: impl Into<String>) -> Self {
        let graph_url = graph_url.into();
        let query = Query::get(format!("{}/v1.0/me", graph_url.trim_end_matches('/')), &graph_url);
        Self {
            graph_url,
            query,
            samples: SamplesState::default(),
            token: None,
            profile: None,
            permissions: PermissionsState::default(),
            status: None,
            response: None,
            running: false,
            copilot: CopilotState::default(),
            collection: ResourceCollection::default(),
            theme: ThemeChoice::default(),
        }
    }

    pub fn token_present(&self) -> bool {
        self.token.is_some()
    }

    pub fn permissions_view(&self) -> PermissionsView {
        PermissionsView::classify(
            self.token_present(),
            &self.permissions.scopes,
            self.permissions.scopes_error.as_ref(),
        )
    }

    /// The full permission list filtered by the panel's search box, with
    /// groups by scope prefix.
    pub fn filtered_full_permissions(&self) -> (Vec<Permission>, Vec<Group>) {
        let filtered = search_permissions(&self.permissions.full, &self.permissions.keyword);
        let groups = generate_groups(&filtered, Permission::group_name).unwrap_or_default();
        (filtered, groups)
    }

    fn refresh_consent(&mut self) {
        let token_present = self.token.is_some();
        let empty = Default::default();
        let scopes = self.token.as_ref().map(AuthToken::consented_scopes).unwrap_or(&empty);
        set_consented_status(token_present, &mut self.permissions.scopes, scopes);
        set_consented_status(token_present, &mut self.permissions.full, scopes);
    }
}

pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SamplesRequested => state.samples.loading = true,
        Action::SamplesLoaded(catalog) => {
            state.samples.loading = false;
            state.samples.cached = catalog.cached;
            state.samples.catalog = catalog.queries;
            state.samples.refresh();
            if catalog.cached {
                state.status = Some(Status {
                    message_type: MessageType::Warning,
                    status_text: "Samples".to_string(),
                    status: StatusValue::Text(CACHED_SAMPLES_NOTICE.to_string()),
                    duration_ms: None,
                    hint: None,
                });
            }
        }
        Action::SampleSearchChanged(keyword) => {
            state.samples.keyword = keyword;
            state.samples.refresh();
        }
        Action::SampleSelected(index) => {
            let Some(selected) = state.samples.visible.get(index).cloned() else {
                return;
            };
            state.samples.selected = Some(index);
            if !should_run_query(selected.method, state.token_present()) {
                debug!(sample = %selected.human_name, "sample requires sign-in");
                return;
            }
            state.query = sample::from_sample(&selected, state.profile.as_ref(), &state.graph_url);
            if let Some(tip) = sample::tip_status(&selected) {
                state.status = Some(tip);
            }
        }
        Action::QueryReplaced(query) => state.query = query,
        Action::MethodChanged(method) => state.query.selected_verb = method,
        Action::UrlChanged(url) => {
            if let Some(version) = crate::query::version_from_url(&url, &state.graph_url) {
                state.query.selected_version = version;
            }
            state.query.sample_url = url;
        }
        Action::SignedIn(token) => {
            state.token = Some(token);
            state.refresh_consent();
        }
        Action::SignedOut => {
            state.token = None;
            state.profile = None;
            state.copilot.in_flight = None;
            state.refresh_consent();
        }
        Action::ProfileLoaded(result) => match result {
            Ok(profile) => state.profile = Some(profile),
            Err(err) => state.status = Some(Status::error("Profile", err)),
        },
        Action::ScopesRequested => state.permissions.loading_scopes = true,
        Action::ScopesLoaded(result) => {
            state.permissions.loading_scopes = false;
            match result {
                Ok(scopes) => {
                    state.permissions.scopes = scopes;
                    state.permissions.scopes_error = None;
                }
                Err(err) => {
                    state.permissions.scopes.clear();
                    state.permissions.scopes_error = Some(err);
                }
            }
            state.refresh_consent();
        }
        Action::FullPermissionsLoaded(result) => {
            match result {
                Ok(full) => {
                    state.permissions.full = full;
                    state.permissions.full_error = None;
                }
                Err(err) => state.permissions.full_error = Some(err),
            }
            state.refresh_consent();
        }
        Action::PermissionSearchChanged(keyword) => state.permissions.keyword = keyword,
        Action::RequestStarted => {
            state.running = true;
            state.response = None;
        }
        Action::RequestFinished(result) => {
            state.running = false;
            match result {
                Ok(response) => {
                    state.status = Some(Status {
                        message_type: if response.is_success() {
                            MessageType::Success
                        } else {
                            MessageType::Error
                        },
                        status_text: response.status_text.clone(),
                        status: StatusValue::Code(response.status),
                        duration_ms: Some(response.duration_ms),
                        hint: None,
                    });
                    state.response = Some(response);
                }
                Err(err) => state.status = Some(Status::error("Request failed", err)),
            }
        }
        Action::CopilotTextChanged(text) => state.copilot.text = text,
        Action::CopilotStarted(request_id) => state.copilot.in_flight = Some(request_id),
        Action::CopilotFinished { request_id, result } => {
            if state.copilot.in_flight.as_deref() != Some(request_id.as_str()) {
                debug!(%request_id, "discarding superseded copilot response");
                return;
            }
            state.copilot.in_flight = None;
            match result {
                Ok(query) => state.query = query,
                Err(err) => state.status = Some(Status::error("Copilot", err.to_string())),
            }
        }
        Action::StatusLinkActivated(url) => {
            state.query = query_from_link(&state.query, &url, &state.graph_url);
        }
        Action::StatusShown(status) => state.status = Some(status),
        Action::StatusDismissed => state.status = None,
        Action::QueryAddedToCollection => {
            let link = ResourceLink::from_query(&state.query);
            state.collection.add_paths([link]);
        }
        Action::CollectionPathRemoved(link) => state.collection.remove_paths(&[link]),
        Action::CollectionExported(result) => {
            state.status = Some(match result {
                Ok(path) => Status::info("Export", format!("Collection saved to {}", path.display())),
                Err(err) => Status::error("Export", err),
            });
        }
        Action::ThemeChanged(theme) => state.theme = theme,
    }
}
