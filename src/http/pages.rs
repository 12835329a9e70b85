//! Server-rendered dashboard and feed pages

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::app::AppState;
use crate::feed::contact::encode_component;
use crate::feed::{filter_items, Facet, FeedItem, FeedQuery, FeedSnapshot};
use crate::http::routes::{contact_redirect, AppError, FeedView, LostFoundParams, ThriftParams};
use crate::stats::StatsView;
use crate::store::items::{poster_name, LostFoundItem, ThriftItem, THRIFT_CATEGORIES};

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub stats: StatsView,
}

/// One facet choice in the filter bar
pub struct FacetOption {
    pub value: &'static str,
    pub label: &'static str,
    pub href: String,
    pub selected: bool,
}

pub struct Detail {
    pub label: &'static str,
    pub value: String,
}

/// Listing card, also used for the detail view
pub struct Card {
    pub title: String,
    pub description: String,
    pub badge: String,
    pub badge_class: &'static str,
    pub image_url: Option<String>,
    pub date: String,
    pub details: Vec<Detail>,
    pub contact_url: String,
    pub detail_url: String,
}

#[derive(Template)]
#[template(path = "pages/feed.html")]
pub struct FeedTemplate {
    pub heading: &'static str,
    pub subtitle: &'static str,
    pub base_path: &'static str,
    pub facet_param: &'static str,
    pub search_placeholder: &'static str,
    pub search: String,
    pub facet_value: String,
    pub facet_as_select: bool,
    pub facet_options: Vec<FacetOption>,
    pub cards: Vec<Card>,
    pub result_note: Option<String>,
    pub empty_message: Option<String>,
    pub error: Option<&'static str>,
    pub loading: bool,
    pub selected: Option<Card>,
    pub close_url: String,
}

/// Static layout of one feed page
pub struct PageLayout {
    pub heading: &'static str,
    pub subtitle: &'static str,
    pub base_path: &'static str,
    pub facet_param: &'static str,
    pub search_placeholder: &'static str,
    pub all_label: &'static str,
    pub facets: &'static [(&'static str, &'static str)],
    pub facet_as_select: bool,
}

pub const LOST_FOUND_PAGE: PageLayout = PageLayout {
    heading: "Lost & Found",
    subtitle: "Help find lost items or report found items",
    base_path: "/lost-found",
    facet_param: "type",
    search_placeholder: "Search lost or found items...",
    all_label: "All Items",
    facets: &[("lost", "Lost"), ("found", "Found")],
    facet_as_select: false,
};

pub const THRIFT_PAGE: PageLayout = PageLayout {
    heading: "Thrift Store",
    subtitle: "Buy and sell pre-loved items",
    base_path: "/thrift",
    facet_param: "category",
    search_placeholder: "Search items...",
    all_label: "All Categories",
    facets: THRIFT_CATEGORIES,
    facet_as_select: true,
};

/// Page URL carrying the search, facet and optional selection
pub fn page_url(layout: &PageLayout, query: &FeedQuery, selected: Option<&str>) -> String {
    let mut pairs = Vec::new();
    if query.has_search() {
        pairs.push(format!("q={}", encode_component(&query.search)));
    }
    if let Facet::Only(value) = &query.facet {
        pairs.push(format!("{}={}", layout.facet_param, encode_component(value)));
    }
    if let Some(id) = selected {
        pairs.push(format!("selected={}", encode_component(id)));
    }

    if pairs.is_empty() {
        layout.base_path.to_string()
    } else {
        format!("{}?{}", layout.base_path, pairs.join("&"))
    }
}

/// Render state for one feed page request
pub fn feed_page<T, F>(
    layout: &PageLayout,
    snapshot: &FeedSnapshot<T>,
    view: &FeedView,
    to_card: F,
) -> FeedTemplate
where
    T: FeedItem,
    F: Fn(&T) -> Card,
{
    let query = &view.query;
    let with_detail_url = |item: &T| {
        let mut card = to_card(item);
        card.detail_url = page_url(layout, query, Some(item.id()));
        card
    };

    let cards: Vec<Card> = filter_items(&snapshot.items, query)
        .into_iter()
        .map(|item| with_detail_url(item))
        .collect();

    let facet_options = std::iter::once(("all", layout.all_label))
        .chain(layout.facets.iter().copied())
        .map(|(value, label)| FacetOption {
            value,
            label,
            href: page_url(layout, &FeedQuery::new(query.search.clone(), Facet::parse(Some(value))), None),
            selected: query.facet.is(value),
        })
        .collect();

    let result_note = query
        .has_search()
        .then(|| format!("Found {} items", cards.len()));

    // A failed load shows only the error banner
    let show_empty = cards.is_empty() && !snapshot.loading && snapshot.error.is_none();
    let empty_message = show_empty.then(|| {
        if query.has_search() {
            format!("No results for \"{}\". Try a different search.", query.search)
        } else {
            "Be the first to post an item!".to_string()
        }
    });

    FeedTemplate {
        heading: layout.heading,
        subtitle: layout.subtitle,
        base_path: layout.base_path,
        facet_param: layout.facet_param,
        search_placeholder: layout.search_placeholder,
        search: query.search.clone(),
        facet_value: query.facet.as_str().to_string(),
        facet_as_select: layout.facet_as_select,
        facet_options,
        result_note,
        empty_message,
        error: snapshot.error,
        loading: snapshot.loading && snapshot.items.is_empty(),
        selected: view.selection.resolve(&snapshot.items).map(with_detail_url),
        close_url: page_url(layout, query, None),
        cards,
    }
}

pub fn lost_found_card(item: &LostFoundItem, mail_endpoint: &str) -> Card {
    let date = item.date.unwrap_or_else(|| item.created_at.date_naive());

    Card {
        title: item.title.clone(),
        description: item.description.clone(),
        badge: item.item_type.as_str().to_uppercase(),
        badge_class: match item.item_type {
            crate::store::items::ItemType::Lost => "badge-lost",
            crate::store::items::ItemType::Found => "badge-found",
        },
        image_url: item.image_url.clone(),
        date: date.format("%-m/%-d/%Y").to_string(),
        details: vec![
            Detail {
                label: "Location",
                value: item.location.clone(),
            },
            Detail {
                label: "Posted by",
                value: poster_name(&item.user_email).to_string(),
            },
        ],
        contact_url: item.contact_link(mail_endpoint),
        detail_url: String::new(),
    }
}

pub fn thrift_card(item: &ThriftItem, mail_endpoint: &str) -> Card {
    let mut details = Vec::new();
    if let Some(condition) = &item.condition {
        details.push(Detail {
            label: "Condition",
            value: condition.clone(),
        });
    }
    if let Some(category) = &item.category {
        details.push(Detail {
            label: "Category",
            value: category.clone(),
        });
    }
    details.push(Detail {
        label: "Posted by",
        value: poster_name(&item.user_email).to_string(),
    });

    Card {
        title: item.title.clone(),
        description: item.description.clone(),
        badge: format!("${}", item.price),
        badge_class: "badge-price",
        image_url: item.image_url.clone(),
        date: item.created_at.format("%-m/%-d/%Y").to_string(),
        details,
        contact_url: item.contact_link(mail_endpoint),
        detail_url: String::new(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn dashboard(State(state): State<AppState>) -> Html<DashboardTemplate> {
    let stats = state.stats.refresh().await;
    Html(DashboardTemplate { stats })
}

pub async fn lost_found(
    State(state): State<AppState>,
    Query(params): Query<LostFoundParams>,
) -> Html<FeedTemplate> {
    state.lost_found.mount().await;
    let snapshot = state.lost_found.snapshot();
    let endpoint = state.config.mail_compose_url.as_str();

    Html(feed_page(
        &LOST_FOUND_PAGE,
        &snapshot,
        &FeedView::from(params),
        |item| lost_found_card(item, endpoint),
    ))
}

pub async fn thrift(
    State(state): State<AppState>,
    Query(params): Query<ThriftParams>,
) -> Html<FeedTemplate> {
    state.thrift.mount().await;
    let snapshot = state.thrift.snapshot();
    let endpoint = state.config.mail_compose_url.as_str();

    Html(feed_page(
        &THRIFT_PAGE,
        &snapshot,
        &FeedView::from(params),
        |item| thrift_card(item, endpoint),
    ))
}

/// "Try Again" on the error banner
pub async fn reload_lost_found(State(state): State<AppState>) -> Redirect {
    state.lost_found.load().await;
    Redirect::to(LOST_FOUND_PAGE.base_path)
}

pub async fn reload_thrift(State(state): State<AppState>) -> Redirect {
    state.thrift.load().await;
    Redirect::to(THRIFT_PAGE.base_path)
}

pub async fn contact_lost_found(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    contact_redirect(&state.lost_found, &id, &state.config.mail_compose_url).await
}

pub async fn contact_thrift(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    contact_redirect(&state.thrift, &id, &state.config.mail_compose_url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::{lost, thrift as thrift_item};
    use crate::feed::Selection;
    use std::sync::Arc;

    fn snapshot<T>(items: Vec<T>) -> FeedSnapshot<T> {
        FeedSnapshot {
            items: Arc::new(items),
            loading: false,
            error: None,
        }
    }

    fn view(search: &str, facet: Facet, selected: Option<&str>) -> FeedView {
        FeedView {
            query: FeedQuery::new(search, facet),
            selection: Selection::from_param(selected),
        }
    }

    #[test]
    fn page_url_encodes_state() {
        let query = FeedQuery::new("blue bag", Facet::Only("lost".into()));
        assert_eq!(
            page_url(&LOST_FOUND_PAGE, &query, Some("7")),
            "/lost-found?q=blue%20bag&type=lost&selected=7"
        );
        assert_eq!(page_url(&THRIFT_PAGE, &FeedQuery::default(), None), "/thrift");
    }

    #[test]
    fn feed_page_filters_and_notes_count() {
        let snap = snapshot(vec![
            lost("1", "Blue Backpack", "left in library"),
            lost("2", "Keys", "silver"),
        ]);
        let page = feed_page(&LOST_FOUND_PAGE, &snap, &view("backpack", Facet::All, None), |item| {
            lost_found_card(item, "https://mail")
        });

        assert_eq!(page.cards.len(), 1);
        assert_eq!(page.cards[0].badge, "LOST");
        assert_eq!(page.cards[0].detail_url, "/lost-found?q=backpack&selected=1");
        assert_eq!(page.result_note.as_deref(), Some("Found 1 items"));
        assert!(page.empty_message.is_none());
        assert!(page.selected.is_none());
    }

    #[test]
    fn feed_page_empty_messages() {
        let snap = snapshot(vec![lost("1", "Keys", "")]);

        let searching = feed_page(&LOST_FOUND_PAGE, &snap, &view("xyz", Facet::All, None), |i| {
            lost_found_card(i, "m")
        });
        assert_eq!(
            searching.empty_message.as_deref(),
            Some("No results for \"xyz\". Try a different search.")
        );

        let faceted = feed_page(
            &LOST_FOUND_PAGE,
            &snap,
            &view("", Facet::Only("found".into()), None),
            |i| lost_found_card(i, "m"),
        );
        assert_eq!(faceted.empty_message.as_deref(), Some("Be the first to post an item!"));
        assert!(faceted.result_note.is_none());
    }

    #[test]
    fn failed_first_load_shows_only_the_error() {
        let snap = FeedSnapshot::<LostFoundItem> {
            items: Arc::new(Vec::new()),
            loading: false,
            error: Some(crate::feed::loader::LOAD_ERROR_MESSAGE),
        };
        let page = feed_page(&LOST_FOUND_PAGE, &snap, &view("", Facet::All, None), |i| {
            lost_found_card(i, "m")
        });
        assert!(page.error.is_some());
        assert!(page.empty_message.is_none());
        assert!(page.cards.is_empty());
    }

    #[test]
    fn selection_resolves_even_when_filtered_out() {
        let snap = snapshot(vec![lost("1", "Keys", ""), lost("2", "Wallet", "")]);
        let page = feed_page(&LOST_FOUND_PAGE, &snap, &view("keys", Facet::All, Some("2")), |i| {
            lost_found_card(i, "m")
        });
        assert_eq!(page.selected.as_ref().map(|c| c.title.as_str()), Some("Wallet"));
        assert_eq!(page.close_url, "/lost-found?q=keys");
    }

    #[test]
    fn thrift_facet_options_include_all_and_categories() {
        let snap = snapshot(vec![thrift_item("1", "Desk", "", Some("Furniture"), 25.0)]);
        let page = feed_page(
            &THRIFT_PAGE,
            &snap,
            &view("", Facet::Only("Furniture".into()), None),
            |i| thrift_card(i, "m"),
        );

        let values: Vec<_> = page.facet_options.iter().map(|o| o.value).collect();
        assert_eq!(
            values,
            vec!["all", "Electronics", "Furniture", "Clothing", "Books", "Sports", "Other"]
        );
        assert!(page.facet_options.iter().any(|o| o.value == "Furniture" && o.selected));
        assert_eq!(page.cards[0].badge, "$25");
    }

    #[test]
    fn templates_render() {
        let snap = snapshot(vec![thrift_item("1", "Desk <oak>", "", Some("Furniture"), 25.0)]);
        let page = feed_page(&THRIFT_PAGE, &snap, &view("", Facet::All, Some("1")), |i| {
            thrift_card(i, "https://mail")
        });
        let html = page.render().unwrap();
        assert!(html.contains("Thrift Store"));
        assert!(html.contains("Desk &lt;oak&gt;"));

        let dashboard = DashboardTemplate {
            stats: StatsView {
                summary: crate::stats::StatsSummary {
                    lost: 3,
                    found: 5,
                    thrift: 2,
                    reunited: 1,
                    loading: false,
                },
                stale: true,
            },
        };
        let html = dashboard.render().unwrap();
        assert!(html.contains("Reunited"));
        assert!(html.contains("may be out of date"));
    }
}
