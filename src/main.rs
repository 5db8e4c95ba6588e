mod auth;
mod collections;
mod config;
mod copilot;
mod groups;
mod http;
mod permissions;
mod query;
mod samples;
mod state;
mod status;
mod storage;
mod ui;

use std::sync::Arc;

use iced::widget::{column, container, row, text_editor};
use iced::{Element, Length, Task};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use auth::{AuthToken, UserProfile};
use collections::ResourceCollection;
use config::{AppConfig, CacheLocation};
use copilot::CopilotError;
use http::cancel::CancelRegistry;
use http::client::{build_client, parse_header_lines, send_request};
use http::method::HttpMethod;
use http::request::RequestInput;
use http::response::HttpResponse;
use permissions::{Permission, PermissionFetchError};
use query::{Header, Query, SampleBody};
use samples::SampleCatalog;
use state::{reduce, Action, AppState, ThemeChoice};
use status::{LinkAction, Status};
use storage::LocalStore;
use ui::style;

const CURRENT_QUERY_KEY: &str = "CURRENT_QUERY";
const COLLECTION_KEY: &str = "RESOURCE_COLLECTION";

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    iced::application("Graph Explorer", update, view)
        .theme(|app: &App| style::app_theme(app.state.theme))
        .window_size((1280.0, 860.0))
        .run_with(App::boot)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarView {
    Samples,
    Copilot,
    Collection,
    Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEditorTab {
    Headers,
    Body,
    Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTab {
    Body,
    Headers,
}

struct App {
    state: AppState,
    config: AppConfig,
    client: reqwest::Client,
    store: Option<LocalStore>,
    cancel: Arc<CancelRegistry>,
    sidebar_open: bool,
    sidebar_view: SidebarView,
    request_tab: RequestEditorTab,
    response_tab: ResponseTab,
    headers_editor: text_editor::Content,
    body_editor: text_editor::Content,
    token_input: String,
    pretty_json: bool,
}

impl App {
    fn boot() -> (Self, Task<Message>) {
        let config = config::load_from_env().unwrap_or_else(|err| {
            error!(error = %err, "invalid configuration, using defaults");
            AppConfig::default()
        });
        let client = build_client(config.request_timeout_secs).unwrap_or_else(|err| {
            warn!(error = %err, "falling back to a default HTTP client");
            reqwest::Client::new()
        });
        let store = match LocalStore::open(&config.data_dir) {
            Ok(store) => Some(store),
            Err(err) => {
                warn!(error = %err, "local state is unavailable");
                None
            }
        };

        let mut state = AppState::new(config.graph_url.clone());
        if let Some(store) = &store {
            restore_local_state(store, config.auth.cache_location, &mut state);
        }

        let mut app = Self {
            state,
            config,
            client,
            store,
            cancel: Arc::new(CancelRegistry::new()),
            sidebar_open: true,
            sidebar_view: SidebarView::Samples,
            request_tab: RequestEditorTab::Headers,
            response_tab: ResponseTab::Body,
            headers_editor: text_editor::Content::new(),
            body_editor: text_editor::Content::new(),
            token_input: String::new(),
            pretty_json: true,
        };
        app.sync_editors();
        info!(
            graph_url = %app.config.graph_url,
            client_id = %app.config.auth.client_id,
            signed_in = app.state.token.is_some(),
            cache = ?app.config.auth.cache_location,
            "graph explorer started"
        );

        reduce(&mut app.state, Action::SamplesRequested);
        let boot = Task::batch([
            Task::perform(
                samples::fetch_samples(app.client.clone(), app.config.samples_url()),
                Message::SamplesLoaded,
            ),
            Task::perform(
                permissions::fetch_full_permissions(app.client.clone(), app.config.devx_api_url.clone()),
                Message::FullPermissionsLoaded,
            ),
            app.fetch_scopes(),
            app.fetch_profile(),
        ]);
        (app, boot)
    }

    fn fetch_profile(&self) -> Task<Message> {
        let Some(token) = &self.state.token else {
            return Task::none();
        };
        Task::perform(
            auth::fetch_profile(
                self.client.clone(),
                self.config.graph_url.clone(),
                token.secret().to_string(),
            ),
            Message::ProfileLoaded,
        )
    }

    fn sync_editors(&mut self) {
        self.headers_editor = text_editor::Content::with_text(&self.state.query.headers_text());
        self.body_editor = text_editor::Content::with_text(&self.state.query.body_text());
    }

    fn fetch_scopes(&mut self) -> Task<Message> {
        reduce(&mut self.state, Action::ScopesRequested);
        Task::perform(
            permissions::fetch_scopes(
                self.client.clone(),
                self.config.devx_api_url.clone(),
                self.state.query.clone(),
            ),
            Message::ScopesLoaded,
        )
    }

    /// Run an action that may swap the current query, refreshing the editors
    /// and the required permissions when it did.
    fn load_query(&mut self, action: Action) -> Task<Message> {
        let before = self.state.query.clone();
        reduce(&mut self.state, action);
        if self.state.query == before {
            return Task::none();
        }
        self.sync_editors();
        self.persist_query();
        self.fetch_scopes()
    }

    fn persist_query(&self) {
        if let Some(store) = &self.store {
            if let Err(err) = store.set_json(CURRENT_QUERY_KEY, &self.state.query) {
                warn!(error = %err, "failed to persist the current query");
            }
        }
    }

    fn persist_collection(&self) {
        if let Some(store) = &self.store {
            if let Err(err) = store.set_json(COLLECTION_KEY, &self.state.collection) {
                warn!(error = %err, "failed to persist the collection");
            }
        }
    }

    /// The query as edited in the request bar and editors.
    fn edited_query(&self) -> Result<Query, String> {
        let sample_headers = parse_header_lines(&self.headers_editor.text())?
            .into_iter()
            .map(|(name, value)| Header::new(name, value))
            .collect();
        let body = self.body_editor.text();
        let sample_body = if body.trim().is_empty() {
            None
        } else {
            Some(SampleBody::parse(body.trim()))
        };
        Ok(Query {
            sample_headers,
            sample_body,
            ..self.state.query.clone()
        })
    }
}

fn restore_local_state(store: &LocalStore, cache_location: CacheLocation, state: &mut AppState) {
    match store.read_theme() {
        Ok(Some(key)) => match ThemeChoice::from_key(&key) {
            Some(theme) => reduce(state, Action::ThemeChanged(theme)),
            None => warn!(%key, "ignoring unknown stored theme"),
        },
        Ok(None) => {}
        Err(err) => warn!(error = %err, "failed to read the stored theme"),
    }
    match store.get_json::<Query>(CURRENT_QUERY_KEY) {
        Ok(Some(query)) => reduce(state, Action::QueryReplaced(query)),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "failed to restore the last query"),
    }
    match store.get_json::<ResourceCollection>(COLLECTION_KEY) {
        Ok(Some(collection)) => state.collection = collection,
        Ok(None) => {}
        Err(err) => warn!(error = %err, "failed to restore the collection"),
    }
    match auth::restore_token(store, cache_location) {
        Ok(Some(token)) => reduce(state, Action::SignedIn(token)),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "failed to restore the signed-in token"),
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    SidebarTogglePressed,
    SidebarViewSelected(SidebarView),
    RequestTabSelected(RequestEditorTab),
    ResponseTabSelected(ResponseTab),
    ThemeSelected(ThemeChoice),
    TokenInputChanged(String),
    SignInPressed,
    SignOutPressed,
    ProfileLoaded(Result<UserProfile, String>),
    SamplesLoaded(SampleCatalog),
    SampleSearchChanged(String),
    SampleSelected(usize),
    MethodSelected(HttpMethod),
    UrlChanged(String),
    HeadersEdited(text_editor::Action),
    BodyEdited(text_editor::Action),
    PrettyJsonToggled(bool),
    SendPressed,
    RequestFinished(Result<HttpResponse, String>),
    ScopesLoaded(Result<Vec<Permission>, PermissionFetchError>),
    FullPermissionsLoaded(Result<Vec<Permission>, PermissionFetchError>),
    PermissionSearchChanged(String),
    CopilotTextChanged(String),
    CopilotSubmitted,
    CopilotFinished {
        request_id: String,
        result: Option<Result<Query, CopilotError>>,
    },
    StatusLinkPressed {
        url: String,
        action: LinkAction,
    },
    StatusDismissed,
    AddToCollectionPressed,
    CollectionPathRemoved(usize),
    ExportPressed,
}

fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::SidebarTogglePressed => {
            app.sidebar_open = !app.sidebar_open;
            Task::none()
        }
        Message::SidebarViewSelected(view) => {
            app.sidebar_view = view;
            Task::none()
        }
        Message::RequestTabSelected(tab) => {
            app.request_tab = tab;
            Task::none()
        }
        Message::ResponseTabSelected(tab) => {
            app.response_tab = tab;
            Task::none()
        }
        Message::ThemeSelected(theme) => {
            reduce(&mut app.state, Action::ThemeChanged(theme));
            if let Some(store) = &app.store {
                if let Err(err) = store.save_theme(theme.key()) {
                    warn!(error = %err, "failed to persist the theme");
                }
            }
            Task::none()
        }
        Message::TokenInputChanged(value) => {
            app.token_input = value;
            Task::none()
        }
        Message::SignInPressed => match AuthToken::parse(&app.token_input) {
            Ok(token) => {
                if let Some(store) = &app.store {
                    if let Err(err) = auth::save_token(store, app.config.auth.cache_location, &token) {
                        warn!(error = %err, "failed to keep the signed-in token");
                    }
                }
                reduce(&mut app.state, Action::SignedIn(token));
                app.token_input.clear();
                app.fetch_profile()
            }
            Err(err) => {
                reduce(&mut app.state, Action::StatusShown(Status::error("Sign in", err.to_string())));
                Task::none()
            }
        },
        Message::SignOutPressed => {
            let cancelled = app.cancel.cancel_all();
            if cancelled > 0 {
                debug!(cancelled, "dropped pending copilot requests on sign out");
            }
            if let Some(store) = &app.store {
                if let Err(err) = auth::clear_token(store) {
                    warn!(error = %err, "failed to forget the signed-in token");
                }
            }
            reduce(&mut app.state, Action::SignedOut);
            Task::none()
        }
        Message::ProfileLoaded(result) => {
            if let Ok(profile) = &result {
                info!(user = %profile.display_name, "signed in");
            }
            reduce(&mut app.state, Action::ProfileLoaded(result));
            Task::none()
        }
        Message::SamplesLoaded(catalog) => {
            reduce(&mut app.state, Action::SamplesLoaded(catalog));
            Task::none()
        }
        Message::SampleSearchChanged(keyword) => {
            reduce(&mut app.state, Action::SampleSearchChanged(keyword));
            Task::none()
        }
        Message::SampleSelected(index) => app.load_query(Action::SampleSelected(index)),
        Message::MethodSelected(method) => {
            reduce(&mut app.state, Action::MethodChanged(method));
            Task::none()
        }
        Message::UrlChanged(url) => {
            reduce(&mut app.state, Action::UrlChanged(url));
            Task::none()
        }
        Message::HeadersEdited(action) => {
            app.headers_editor.perform(action);
            Task::none()
        }
        Message::BodyEdited(action) => {
            app.body_editor.perform(action);
            Task::none()
        }
        Message::PrettyJsonToggled(enabled) => {
            app.pretty_json = enabled;
            Task::none()
        }
        Message::SendPressed => {
            if app.state.running {
                return Task::none();
            }
            if app.state.query.sample_url.trim().is_empty() {
                reduce(&mut app.state, Action::StatusShown(Status::error("Request", "URL cannot be empty")));
                return Task::none();
            }
            let mut query = match app.edited_query() {
                Ok(query) => query,
                Err(err) => {
                    reduce(&mut app.state, Action::StatusShown(Status::error("Request", err)));
                    return Task::none();
                }
            };

            query::tokens::substitute_tokens(&mut query, app.state.profile.as_ref());
            reduce(&mut app.state, Action::QueryReplaced(query));
            reduce(&mut app.state, Action::RequestStarted);
            app.persist_query();

            let request = RequestInput {
                method: app.state.query.selected_verb,
                url: app.state.query.sample_url.trim().to_string(),
                headers: app.state.query.headers_text(),
                body: app.state.query.body_text(),
                bearer_token: app.state.token.as_ref().map(|token| token.secret().to_string()),
            };
            debug!(method = %request.method, url = %request.url, "running query");

            Task::batch([
                Task::perform(send_request(app.client.clone(), request), Message::RequestFinished),
                app.fetch_scopes(),
            ])
        }
        Message::RequestFinished(result) => {
            if let Err(err) = &result {
                warn!(error = %err, "query failed");
            }
            reduce(&mut app.state, Action::RequestFinished(result));
            Task::none()
        }
        Message::ScopesLoaded(result) => {
            reduce(&mut app.state, Action::ScopesLoaded(result));
            Task::none()
        }
        Message::FullPermissionsLoaded(result) => {
            if let Err(err) = &result {
                warn!(error = %err, "failed to load the permission catalog");
            }
            reduce(&mut app.state, Action::FullPermissionsLoaded(result));
            Task::none()
        }
        Message::PermissionSearchChanged(keyword) => {
            reduce(&mut app.state, Action::PermissionSearchChanged(keyword));
            Task::none()
        }
        Message::CopilotTextChanged(text) => {
            reduce(&mut app.state, Action::CopilotTextChanged(text));
            Task::none()
        }
        Message::CopilotSubmitted => {
            let text = app.state.copilot.text.trim().to_string();
            if text.is_empty() {
                return Task::none();
            }
            if let Some(previous) = app.state.copilot.in_flight.take() {
                app.cancel.cancel(&previous);
            }

            let request_id = Uuid::new_v4().to_string();
            let cancel_rx = app.cancel.register(&request_id);
            reduce(&mut app.state, Action::CopilotStarted(request_id.clone()));

            Task::perform(
                copilot::submit_cancellable(
                    app.client.clone(),
                    app.config.copilot_endpoint.clone(),
                    text,
                    app.config.graph_url.clone(),
                    cancel_rx,
                ),
                move |result| Message::CopilotFinished {
                    request_id: request_id.clone(),
                    result,
                },
            )
        }
        Message::CopilotFinished { request_id, result } => {
            app.cancel.remove(&request_id);
            match result {
                Some(result) => app.load_query(Action::CopilotFinished { request_id, result }),
                None => {
                    debug!(%request_id, "copilot request cancelled");
                    Task::none()
                }
            }
        }
        Message::StatusLinkPressed { url, action } => match action {
            LinkAction::LoadQuery => app.load_query(Action::StatusLinkActivated(url)),
            LinkAction::OpenExternal => {
                reduce(
                    &mut app.state,
                    Action::StatusShown(Status::info("Link", format!("Copied {url} to the clipboard"))),
                );
                iced::clipboard::write(url)
            }
        },
        Message::StatusDismissed => {
            reduce(&mut app.state, Action::StatusDismissed);
            Task::none()
        }
        Message::AddToCollectionPressed => {
            reduce(&mut app.state, Action::QueryAddedToCollection);
            app.persist_collection();
            Task::none()
        }
        Message::CollectionPathRemoved(index) => {
            if let Some(link) = app.state.collection.paths.get(index).cloned() {
                reduce(&mut app.state, Action::CollectionPathRemoved(link));
                app.persist_collection();
            }
            Task::none()
        }
        Message::ExportPressed => {
            let result = collections::export_collection(
                &app.state.collection,
                &app.config.graph_url,
                &app.config.export_path(),
            )
            .map_err(|err| err.to_string());
            reduce(&mut app.state, Action::CollectionExported(result));
            Task::none()
        }
    }
}

fn view(app: &App) -> Element<'_, Message> {
    let header = ui::header::view(ui::header::HeaderState {
        sidebar_open: app.sidebar_open,
        theme: app.state.theme,
        profile: app.state.profile.as_ref(),
        signed_in: app.state.token_present(),
        token_input: &app.token_input,
    });

    let sidebar = if app.sidebar_open {
        Some(
            container(ui::sidebar::view(app.sidebar_view, &app.state))
                .width(300)
                .height(Length::Fill),
        )
    } else {
        None
    };

    let request_bar = container(ui::request_bar::view(&app.state.query, app.state.running))
        .padding(12)
        .style(|theme| style::surface_style(theme, style::Layer::Raised, 0.0));

    let request_editor = ui::request_editor::view(ui::request_editor::RequestEditorState {
        active_tab: app.request_tab,
        headers_editor: &app.headers_editor,
        body_editor: &app.body_editor,
        state: &app.state,
    });

    let request_section = container(column![request_bar, request_editor].spacing(0).height(Length::Fill))
        .height(Length::FillPortion(45))
        .style(|theme| style::surface_style(theme, style::Layer::Panel, 0.0));

    let response_section = container(ui::response_panel::view(
        app.state.response.as_ref(),
        app.state.running,
        app.pretty_json,
        app.response_tab,
    ))
    .height(Length::FillPortion(55))
    .style(|theme| style::surface_style(theme, style::Layer::Panel, 0.0));

    let mut main_content = column![].spacing(1).height(Length::Fill).width(Length::Fill);
    if let Some(status) = &app.state.status {
        main_content = main_content.push(ui::status_bar::view(status, &app.state.graph_url));
    }
    let main_content = main_content.push(request_section).push(response_section);

    let body: Element<'_, Message> = if let Some(sidebar) = sidebar {
        row![sidebar, container(main_content).width(Length::Fill).height(Length::Fill)]
            .height(Length::Fill)
            .into()
    } else {
        row![container(main_content).width(Length::Fill).height(Length::Fill)]
            .height(Length::Fill)
            .into()
    };

    let layout = column![header, body]
        .spacing(1)
        .height(Length::Fill)
        .width(Length::Fill);

    container(layout)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|theme| style::flat_surface_style(theme, style::Layer::Window))
        .into()
}
