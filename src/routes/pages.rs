use chrono::Utc;
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::{get, post, routes, FromForm, Route, State};
use rocket_dyn_templates::{context, Template};
use serde::Serialize;

use super::{require_user, AuthUser, CsvDownload, Layout, Toast, TOKEN_COOKIE};
use crate::charts::{
    age_slices, choropleth, demographic_insights, first_max_by, geo_insights, heatmap,
    influencer_graph, mention_trend_series, overview_insights, platform_slices,
    sentiment_insights, sentiment_slices, sentiment_trend_series, share_slices, trend_insights,
};
use crate::comparison::{build_comparison, CompetitorSelection};
use crate::error::{DashboardError, Result};
use crate::influence::{bot_threshold_or_default, filter_bots, filter_influencers};
use crate::mentions::{sentiment_counts, MentionQuery};
use crate::mock_api::{MockApi, SettingsPayload};
use crate::models::{Competitor, DailyPoint, Platform, Sentiment, TeamRole, TopicStatus, User};
use crate::store::{AuthStore, ProjectStore};
use crate::widgets::{stat_cards, DateRange};
use crate::workspace::{
    KeywordList, NewAlert, NewScheduledReport, NewTeamMember, NewWebhook, ReportRequest,
};

type Page = std::result::Result<Template, Flash<Redirect>>;
type Action = std::result::Result<Flash<Redirect>, Flash<Redirect>>;

// =====================
// Helpers
// =====================

fn signed_in(user: Option<AuthUser>) -> std::result::Result<User, Flash<Redirect>> {
    require_user(user).map_err(|to| Flash::warning(to, "Please sign in to continue"))
}

fn back_to_projects(err: DashboardError) -> Flash<Redirect> {
    tracing::warn!(error = %err, "dashboard page unavailable");
    Flash::error(Redirect::to("/projects"), err.to_string())
}

fn topic_url(id: &str, page: &str) -> String {
    format!("/topics/{id}/{page}")
}

/// Layout for a topic page; records the topic as the active project
fn topic_layout(
    api: &MockApi,
    projects: &ProjectStore,
    user: User,
    id: &str,
    title: &str,
    section: &'static str,
    flash: Option<FlashMessage<'_>>,
) -> std::result::Result<Layout, Flash<Redirect>> {
    let topic = api.workspace().topic(id).map_err(back_to_projects)?;
    projects.set_topic(&topic.id, &topic.name);
    Ok(Layout {
        title: format!("{title} · {}", topic.name),
        section,
        topic: Some(topic),
        user: Some(user),
        project: projects.snapshot(),
        toast: Toast::from_flash(flash),
    })
}

fn portal_layout(
    projects: &ProjectStore,
    user: Option<User>,
    title: &str,
    section: &'static str,
    flash: Option<FlashMessage<'_>>,
) -> Layout {
    Layout {
        title: title.to_string(),
        section,
        topic: None,
        user,
        project: projects.snapshot(),
        toast: Toast::from_flash(flash),
    }
}

/// Turn a mutation result into a toast on the page the form was posted from
fn toast<T>(result: Result<T>, back: String, message: impl FnOnce(T) -> String) -> Flash<Redirect> {
    match result {
        Ok(value) => Flash::success(Redirect::to(back), message(value)),
        Err(err @ DashboardError::TopicNotFound(_)) => back_to_projects(err),
        Err(err) => {
            tracing::debug!(error = %err, "form action rejected");
            Flash::error(Redirect::to(back), err.to_string())
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|r| {
        r.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

// =====================
// Forms
// =====================

#[derive(FromForm)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(FromForm)]
struct NextForm {
    next: String,
}

#[derive(FromForm)]
struct StatusForm {
    status: TopicStatus,
}

#[derive(FromForm)]
struct DetailsForm {
    name: String,
    #[field(default = String::new())]
    description: String,
}

#[derive(FromForm)]
struct KeywordForm {
    list: KeywordList,
    keyword: String,
}

#[derive(FromForm)]
struct PlatformsForm {
    platforms: Vec<Platform>,
    language: Option<String>,
}

#[derive(FromForm)]
struct SentimentForm {
    /// Missing or "auto" clears the override
    sentiment: Option<Sentiment>,
}

#[derive(FromForm)]
struct ConfigDetailsForm {
    name: String,
    #[field(default = String::new())]
    description: String,
    language: String,
    crawl_frequency: String,
}

#[derive(FromForm)]
struct RoleForm {
    role: TeamRole,
}

#[derive(FromForm)]
struct KeyForm {
    name: String,
}

// =====================
// Session
// =====================

#[get("/")]
fn index() -> Redirect {
    Redirect::to("/projects")
}

#[get("/login")]
fn login_page(
    user: Option<AuthUser>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> std::result::Result<Template, Redirect> {
    if user.is_some() {
        return Err(Redirect::to("/projects"));
    }
    let layout = portal_layout(projects, None, "Sign in", "login", flash);
    Ok(Template::render("login", context! { layout }))
}

#[post("/login", data = "<form>")]
fn login(form: Form<LoginForm>, auth: &State<AuthStore>, cookies: &CookieJar<'_>) -> Flash<Redirect> {
    match auth.login(&form.email, &form.password) {
        Ok(session) => {
            cookies.add(
                Cookie::build((TOKEN_COOKIE, session.token))
                    .path("/")
                    .same_site(SameSite::Lax),
            );
            Flash::success(
                Redirect::to("/projects"),
                format!("Welcome back, {}", session.user.name),
            )
        }
        Err(err) => Flash::error(Redirect::to("/login"), err.to_string()),
    }
}

#[post("/logout")]
fn logout(
    auth: &State<AuthStore>,
    projects: &State<ProjectStore>,
    cookies: &CookieJar<'_>,
) -> Flash<Redirect> {
    auth.logout();
    projects.clear_topic();
    cookies.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    Flash::success(Redirect::to("/login"), "Signed out")
}

#[post("/sidebar/toggle", data = "<form>")]
fn toggle_sidebar(form: Form<NextForm>, projects: &State<ProjectStore>) -> Redirect {
    projects.toggle_sidebar();
    if form.next.starts_with('/') && !form.next.starts_with("//") {
        Redirect::to(form.next.clone())
    } else {
        Redirect::to("/projects")
    }
}

// =====================
// Project portal
// =====================

#[get("/projects?<search>&<status>")]
async fn projects_page(
    search: Option<&str>,
    status: Option<TopicStatus>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    projects.clear_topic();
    let layout = portal_layout(projects, Some(user), "Projects", "projects", flash);

    let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    let topics: Vec<_> = api
        .topics()
        .await
        .into_iter()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .filter(|t| {
            needle.is_empty()
                || t.name.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
        })
        .collect();

    Ok(Template::render(
        "projects",
        context! {
            layout,
            topics,
            search: search.unwrap_or(""),
            status,
        },
    ))
}

#[post("/projects/<id>/status", data = "<form>")]
fn set_project_status(
    id: &str,
    form: Form<StatusForm>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
) -> Action {
    signed_in(user)?;
    let result = api.workspace().set_topic_status(id, form.status);
    Ok(toast(result, "/projects".to_string(), |topic| {
        let status = match topic.status {
            TopicStatus::Active => "active",
            TopicStatus::Paused => "paused",
        };
        format!("{} is now {status}", topic.name)
    }))
}

// =====================
// Creation wizard
// =====================

const WIZARD_URL: &str = "/projects/new";

#[get("/projects/new")]
fn wizard_page(
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = portal_layout(projects, Some(user), "New topic", "wizard", flash);
    let wizard = api.wizard();
    Ok(Template::render(
        "wizard",
        context! {
            layout,
            step: wizard.current_step().number(),
            can_proceed: wizard.can_proceed(),
            form: wizard.form(),
        },
    ))
}

#[post("/projects/new/details", data = "<form>")]
fn wizard_details(form: Form<DetailsForm>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update_wizard(|w| {
        w.set_details(&form.name, &form.description);
        w.advance()
    });
    Ok(toast(result, WIZARD_URL.to_string(), |_| "Details saved".to_string()))
}

#[post("/projects/new/keywords", data = "<form>")]
fn wizard_add_keyword(form: Form<KeywordForm>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update_wizard(|w| w.add_keyword(form.list, &form.keyword));
    Ok(toast(result, WIZARD_URL.to_string(), |_| {
        format!("Added \"{}\"", form.keyword.trim())
    }))
}

#[post("/projects/new/keywords/remove", data = "<form>")]
fn wizard_remove_keyword(
    form: Form<KeywordForm>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
) -> Action {
    signed_in(user)?;
    api.update_wizard(|w| w.remove_keyword(form.list, &form.keyword));
    Ok(Flash::success(Redirect::to(WIZARD_URL), "Keyword removed"))
}

#[post("/projects/new/next")]
fn wizard_next(user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update_wizard(|w| w.advance());
    Ok(toast(result, WIZARD_URL.to_string(), |_| "Step complete".to_string()))
}

#[post("/projects/new/back")]
fn wizard_back(user: Option<AuthUser>, api: &State<MockApi>) -> std::result::Result<Redirect, Flash<Redirect>> {
    signed_in(user)?;
    api.update_wizard(|w| w.back());
    Ok(Redirect::to(WIZARD_URL))
}

#[post("/projects/new/submit", data = "<form>")]
async fn wizard_submit(
    form: Form<PlatformsForm>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
) -> Action {
    signed_in(user)?;
    api.update_wizard(|w| {
        for platform in Platform::ALL {
            w.set_platform(platform, form.platforms.contains(&platform));
        }
        if let Some(language) = form.language.as_deref().filter(|l| !l.trim().is_empty()) {
            w.set_language(language);
        }
    });

    match api.submit_wizard().await {
        Ok(topic) => Ok(Flash::success(
            Redirect::to(topic_url(&topic.id, "overview")),
            format!("Created {}", topic.name),
        )),
        Err(err) => Ok(Flash::error(Redirect::to(WIZARD_URL), err.to_string())),
    }
}

#[post("/projects/new/reset")]
fn wizard_reset(user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    api.reset_wizard();
    Ok(Flash::success(Redirect::to(WIZARD_URL), "Form cleared"))
}

// =====================
// Issue monitoring pages
// =====================

#[get("/topics/<id>")]
fn topic_home(id: &str) -> Redirect {
    Redirect::to(topic_url(id, "overview"))
}

#[get("/topics/<id>/overview")]
async fn overview(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Overview", "overview", flash)?;
    let payload = api.overview(id).await.map_err(back_to_projects)?;
    let data = &payload.data;

    Ok(Template::render(
        "overview",
        context! {
            layout,
            stats: stat_cards(&data.stats),
            platforms: platform_slices(&data.platform_distribution),
            sentiment: sentiment_slices(&data.sentiment),
            insights: overview_insights(data),
            recent: &payload.recent_mentions,
        },
    ))
}

#[get("/topics/<id>/trends?<range>")]
async fn trends(
    id: &str,
    range: Option<String>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let mut layout = topic_layout(api, projects, user, id, "Trends", "trends", flash)?;
    let data = api.trends(id).await.map_err(back_to_projects)?;

    let anchor = data
        .daily
        .iter()
        .map(|p| p.date)
        .max()
        .unwrap_or_else(|| Utc::now().date_naive());
    let requested = range.unwrap_or_else(|| "30d".to_string());
    let range = match DateRange::parse(&requested, anchor) {
        Ok(range) => range,
        Err(err) => {
            layout.toast = Some(Toast {
                kind: "error".to_string(),
                message: err.to_string(),
            });
            DateRange::last_days(30, anchor)
        }
    };
    let visible: Vec<DailyPoint> = data
        .daily
        .iter()
        .filter(|p| range.contains(p.date))
        .cloned()
        .collect();

    Ok(Template::render(
        "trends",
        context! {
            layout,
            range,
            requested,
            presets: DateRange::PRESETS,
            series: mention_trend_series(&data.daily, Some(&range)),
            heatmap: heatmap(&data.hourly),
            insights: trend_insights(&visible),
        },
    ))
}

#[get("/topics/<id>/sentiment")]
async fn sentiment(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Sentiment", "sentiment", flash)?;
    let data = api.sentiment(id).await.map_err(back_to_projects)?;

    Ok(Template::render(
        "sentiment",
        context! {
            layout,
            breakdown: sentiment_slices(&data.breakdown),
            dominant: data.breakdown.dominant(),
            series: sentiment_trend_series(&data.daily),
            emotions: &data.emotions,
            segments: &data.segments,
            insights: sentiment_insights(&data),
        },
    ))
}

#[get("/topics/<id>/geo")]
async fn geo(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Geography", "geo", flash)?;
    let data = api.geo(id).await.map_err(back_to_projects)?;

    Ok(Template::render(
        "geo",
        context! {
            layout,
            map: choropleth(&data),
            insights: geo_insights(&data),
        },
    ))
}

#[get("/topics/<id>/demographics")]
async fn demographics(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Demographics", "demographics", flash)?;
    let data = api.demographics(id).await.map_err(back_to_projects)?;

    Ok(Template::render(
        "demographics",
        context! {
            layout,
            ages: age_slices(&data.age_groups),
            gender: share_slices(&data.gender),
            interests: share_slices(&data.interests),
            insights: demographic_insights(&data),
        },
    ))
}

#[get("/topics/<id>/influencers?<platform>&<min_followers>&<bot_threshold>")]
#[allow(clippy::too_many_arguments)]
async fn influencers(
    id: &str,
    platform: Option<Platform>,
    min_followers: Option<u64>,
    bot_threshold: Option<f64>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Influencers", "influencers", flash)?;
    let data = api.influencers(id).await.map_err(back_to_projects)?;

    let threshold = bot_threshold_or_default(bot_threshold);
    let ranked = filter_influencers(&data.influencers, platform, min_followers);
    let graph = influencer_graph(&ranked, &data.connections);

    Ok(Template::render(
        "influencers",
        context! {
            layout,
            influencers: &ranked,
            graph,
            bots: filter_bots(&data.bots, threshold),
            total_bots: data.bots.len(),
            threshold,
            platform,
            min_followers: min_followers.unwrap_or(0),
            platforms: Platform::ALL,
        },
    ))
}

#[get("/topics/<id>/mentions?<query..>")]
async fn mentions(
    id: &str,
    query: MentionQuery,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Mentions", "mentions", flash)?;
    let page = api.mentions(id, &query).await.map_err(back_to_projects)?;
    let counts = api
        .update(id, |ws| Ok(sentiment_counts(&ws.mentions)))
        .map_err(back_to_projects)?;
    let selected_platforms = query.platform_filter();

    Ok(Template::render(
        "mentions",
        context! {
            layout,
            page,
            counts,
            query,
            selected_platforms,
            platforms: Platform::ALL,
            sentiments: Sentiment::ALL,
        },
    ))
}

#[get("/topics/<id>/mentions/export.csv?<query..>")]
async fn export_mentions(
    id: &str,
    query: MentionQuery,
    user: Option<AuthUser>,
    api: &State<MockApi>,
) -> std::result::Result<CsvDownload, Flash<Redirect>> {
    signed_in(user)?;
    let body = api.export_mentions(id, &query).await.map_err(|err| match err {
        DashboardError::TopicNotFound(_) => back_to_projects(err),
        other => Flash::error(Redirect::to(topic_url(id, "mentions")), other.to_string()),
    })?;
    let filename = format!("mentions-{id}-{}.csv", Utc::now().format("%Y%m%d"));
    tracing::info!(topic_id = id, "mentions exported");
    Ok(CsvDownload::new(filename, body))
}

#[post("/topics/<id>/mentions/<mention_id>/sentiment", data = "<form>")]
fn set_mention_sentiment(
    id: &str,
    mention_id: &str,
    form: Form<SentimentForm>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.set_mention_sentiment(mention_id, form.sentiment));
    Ok(toast(result, topic_url(id, "mentions"), |m| {
        if m.sentiment.is_overridden() {
            format!("Sentiment set to {}", m.sentiment.effective().as_str())
        } else {
            "Sentiment reset to automatic".to_string()
        }
    }))
}

#[post("/topics/<id>/mentions/<mention_id>/handled")]
fn toggle_mention_handled(id: &str, mention_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.toggle_handled(mention_id));
    Ok(toast(result, topic_url(id, "mentions"), |m| {
        (if m.handled { "Marked as handled" } else { "Reopened" }).to_string()
    }))
}

#[post("/topics/<id>/mentions/<mention_id>/flagged")]
fn toggle_mention_flagged(id: &str, mention_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.toggle_flagged(mention_id));
    Ok(toast(result, topic_url(id, "mentions"), |m| {
        (if m.flagged { "Flagged for review" } else { "Flag removed" }).to_string()
    }))
}

/// Checkbox row of the competitor list, with the link that flips it
#[derive(Debug, Serialize)]
struct CompetitorToggle {
    id: String,
    name: String,
    color: String,
    is_own: bool,
    selected: bool,
    href: String,
}

fn competitor_toggles(
    competitors: &[Competitor],
    selection: &CompetitorSelection,
    base: &str,
) -> Vec<CompetitorToggle> {
    competitors
        .iter()
        .map(|c| {
            let mut next = selection.clone();
            next.toggle(&c.id);
            let hidden = next.hidden(competitors);
            let href = if hidden.is_empty() {
                base.to_string()
            } else {
                format!("{base}?hidden={}", hidden.join(","))
            };
            CompetitorToggle {
                id: c.id.clone(),
                name: c.name.clone(),
                color: c.color.clone(),
                is_own: c.is_own,
                selected: selection.is_selected(&c.id),
                href,
            }
        })
        .collect()
}

async fn comparison_page(
    id: &str,
    hidden: Option<&str>,
    layout: Layout,
    api: &MockApi,
    base: String,
    template: &'static str,
) -> Page {
    let competitors = api.competitors(id).await.map_err(back_to_projects)?;
    let selection = CompetitorSelection::without(&competitors, &split_list(hidden));
    let view = build_comparison(&competitors, &selection);
    let toggles = competitor_toggles(&competitors, &selection, &base);

    Ok(Template::render(template, context! { layout, view, toggles }))
}

#[get("/topics/<id>/comparison?<hidden>")]
async fn comparison(
    id: &str,
    hidden: Option<&str>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Comparison", "comparison", flash)?;
    comparison_page(id, hidden, layout, api, topic_url(id, "comparison"), "comparison").await
}

#[get("/topics/<id>/reports")]
async fn reports(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Reports", "reports", flash)?;
    let settings = SettingsPayload::from(api.settings(id).await.map_err(back_to_projects)?);

    Ok(Template::render(
        "reports",
        context! {
            layout,
            scheduled: settings.reports,
            history: settings.history,
        },
    ))
}

#[post("/topics/<id>/reports/generate", data = "<form>")]
async fn generate_report(
    id: &str,
    form: Form<ReportRequest>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
) -> Action {
    signed_in(user)?;
    let result = api.generate_report(id, form.into_inner()).await;
    Ok(toast(result, topic_url(id, "reports"), |r| {
        format!("{} is ready", r.title)
    }))
}

// =====================
// Brand analytics pages
// =====================

#[get("/topics/<id>/brand/overview")]
async fn brand_overview(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Brand overview", "brand_overview", flash)?;
    let data = api.brand_overview(id).await.map_err(back_to_projects)?;

    Ok(Template::render(
        "brand_overview",
        context! {
            layout,
            health_score: data.health_score,
            stats: stat_cards(&data.stats),
            sentiment: sentiment_slices(&data.sentiment),
            weekly: &data.weekly_mentions,
            keywords: &data.top_keywords,
        },
    ))
}

#[get("/topics/<id>/brand/competitors?<hidden>")]
async fn brand_competitors(
    id: &str,
    hidden: Option<&str>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Competitors", "brand_competitors", flash)?;
    comparison_page(
        id,
        hidden,
        layout,
        api,
        topic_url(id, "brand/competitors"),
        "brand_competitors",
    )
    .await
}

#[get("/topics/<id>/brand/content")]
async fn brand_content(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Content", "brand_content", flash)?;
    let mut data = api.content(id).await.map_err(back_to_projects)?;
    data.top_posts
        .sort_by(|a, b| b.engagement.total().cmp(&a.engagement.total()));
    let best_type = first_max_by(&data.content_types, |t| t.avg_engagement).cloned();

    Ok(Template::render(
        "brand_content",
        context! {
            layout,
            posts: &data.top_posts,
            types: &data.content_types,
            best_type,
        },
    ))
}

// =====================
// Settings pages
// =====================

async fn settings_page(
    id: &str,
    layout: Layout,
    api: &MockApi,
    template: &'static str,
) -> Page {
    let settings = SettingsPayload::from(api.settings(id).await.map_err(back_to_projects)?);
    Ok(Template::render(
        template,
        context! {
            layout,
            settings,
            keyword_limit: api.config().keyword_limit,
            platforms: Platform::ALL,
        },
    ))
}

#[get("/topics/<id>/settings/topic-config")]
async fn settings_topic_config(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Topic settings", "settings_topic_config", flash)?;
    settings_page(id, layout, api, "settings_topic_config").await
}

#[get("/topics/<id>/settings/team")]
async fn settings_team(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Team", "settings_team", flash)?;
    settings_page(id, layout, api, "settings_team").await
}

#[get("/topics/<id>/settings/notifications")]
async fn settings_notifications(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "Notifications", "settings_notifications", flash)?;
    settings_page(id, layout, api, "settings_notifications").await
}

#[get("/topics/<id>/settings/api-keys")]
async fn settings_api_keys(
    id: &str,
    user: Option<AuthUser>,
    api: &State<MockApi>,
    projects: &State<ProjectStore>,
    flash: Option<FlashMessage<'_>>,
) -> Page {
    let user = signed_in(user)?;
    let layout = topic_layout(api, projects, user, id, "API access", "settings_api_keys", flash)?;
    settings_page(id, layout, api, "settings_api_keys").await
}

// --- topic configuration ---

fn config_url(id: &str) -> String {
    topic_url(id, "settings/topic-config")
}

#[post("/topics/<id>/settings/topic-config/details", data = "<form>")]
fn config_details(id: &str, form: Form<ConfigDetailsForm>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let limit = api.config().keyword_limit;
    let result = api.update(id, |ws| {
        let mut draft = ws.config.draft().clone();
        draft.name = form.name.clone();
        draft.description = form.description.clone();
        draft.language = form.language.trim().to_string();
        draft.crawl_frequency = form.crawl_frequency.trim().to_string();
        ws.config.set_draft(draft, limit)
    });
    Ok(toast(result, config_url(id), |_| "Draft updated".to_string()))
}

#[post("/topics/<id>/settings/topic-config/keywords", data = "<form>")]
fn config_add_keyword(id: &str, form: Form<KeywordForm>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let limit = api.config().keyword_limit;
    let result = api.update(id, |ws| ws.config.add_keyword(form.list, &form.keyword, limit));
    Ok(toast(result, config_url(id), |_| {
        format!("Added \"{}\"", form.keyword.trim())
    }))
}

#[post("/topics/<id>/settings/topic-config/keywords/remove", data = "<form>")]
fn config_remove_keyword(id: &str, form: Form<KeywordForm>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| Ok(ws.config.remove_keyword(form.list, &form.keyword)));
    Ok(toast(result, config_url(id), |removed| {
        (if removed { "Keyword removed" } else { "Keyword not found" }).to_string()
    }))
}

#[post("/topics/<id>/settings/topic-config/platforms", data = "<form>")]
fn config_platforms(id: &str, form: Form<PlatformsForm>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| {
        for platform in Platform::ALL {
            ws.config.set_platform(platform, form.platforms.contains(&platform));
        }
        Ok(())
    });
    Ok(toast(result, config_url(id), |_| "Platforms updated".to_string()))
}

#[post("/topics/<id>/settings/topic-config/save")]
async fn config_save(id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.save_topic_config(id).await;
    Ok(toast(result, config_url(id), |_| "Settings saved".to_string()))
}

#[post("/topics/<id>/settings/topic-config/cancel")]
fn config_cancel(id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| {
        ws.config.cancel();
        Ok(())
    });
    Ok(toast(result, config_url(id), |_| "Changes discarded".to_string()))
}

// --- team ---

#[post("/topics/<id>/settings/team", data = "<form>")]
fn invite_member(id: &str, form: Form<NewTeamMember>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.invite_member(form.into_inner()));
    Ok(toast(result, topic_url(id, "settings/team"), |m| {
        format!("Invitation sent to {}", m.email)
    }))
}

#[post("/topics/<id>/settings/team/<member_id>/role", data = "<form>")]
fn change_role(
    id: &str,
    member_id: &str,
    form: Form<RoleForm>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.change_role(member_id, form.role));
    Ok(toast(result, topic_url(id, "settings/team"), |m| {
        format!("{} is now {}", m.name, format!("{:?}", m.role).to_lowercase())
    }))
}

#[post("/topics/<id>/settings/team/<member_id>/remove")]
fn remove_member(id: &str, member_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.remove_member(member_id));
    Ok(toast(result, topic_url(id, "settings/team"), |m| {
        format!("Removed {}", m.email)
    }))
}

// --- notifications ---

fn notifications_url(id: &str) -> String {
    topic_url(id, "settings/notifications")
}

#[post("/topics/<id>/settings/notifications/alerts", data = "<form>")]
fn create_alert(id: &str, form: Form<NewAlert>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.create_alert(form.into_inner()));
    Ok(toast(result, notifications_url(id), |a| format!("Alert \"{}\" created", a.name)))
}

#[post("/topics/<id>/settings/notifications/alerts/<alert_id>/toggle")]
fn toggle_alert(id: &str, alert_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.toggle_alert(alert_id));
    Ok(toast(result, notifications_url(id), |a| {
        format!("{} {}", a.name, if a.enabled { "enabled" } else { "paused" })
    }))
}

#[post("/topics/<id>/settings/notifications/alerts/<alert_id>/delete")]
fn delete_alert(id: &str, alert_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.delete_alert(alert_id));
    Ok(toast(result, notifications_url(id), |a| format!("Deleted {}", a.name)))
}

#[post("/topics/<id>/settings/notifications/reports", data = "<form>")]
fn create_scheduled_report(
    id: &str,
    form: Form<NewScheduledReport>,
    user: Option<AuthUser>,
    api: &State<MockApi>,
) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.create_scheduled_report(form.into_inner()));
    Ok(toast(result, notifications_url(id), |r| format!("Scheduled {}", r.name)))
}

#[post("/topics/<id>/settings/notifications/reports/<report_id>/toggle")]
fn toggle_scheduled_report(id: &str, report_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.toggle_scheduled_report(report_id));
    Ok(toast(result, notifications_url(id), |r| {
        format!("{} {}", r.name, if r.enabled { "enabled" } else { "paused" })
    }))
}

#[post("/topics/<id>/settings/notifications/reports/<report_id>/delete")]
fn delete_scheduled_report(id: &str, report_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.delete_scheduled_report(report_id));
    Ok(toast(result, notifications_url(id), |r| format!("Deleted {}", r.name)))
}

// --- api access ---

fn api_keys_url(id: &str) -> String {
    topic_url(id, "settings/api-keys")
}

#[post("/topics/<id>/settings/api-keys", data = "<form>")]
fn create_api_key(id: &str, form: Form<KeyForm>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.generate_api_key(&form.name));
    Ok(toast(result, api_keys_url(id), |k| {
        format!("Copy your new key now, it will not be shown again: {}", k.secret)
    }))
}

#[post("/topics/<id>/settings/api-keys/<key_id>/toggle")]
fn toggle_api_key(id: &str, key_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.toggle_api_key(key_id));
    Ok(toast(result, api_keys_url(id), |k| {
        format!("{} is now {}", k.name, format!("{:?}", k.status).to_lowercase())
    }))
}

#[post("/topics/<id>/settings/api-keys/<key_id>/delete")]
fn delete_api_key(id: &str, key_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.delete_api_key(key_id));
    Ok(toast(result, api_keys_url(id), |k| format!("Deleted {}", k.name)))
}

#[post("/topics/<id>/settings/webhooks", data = "<form>")]
fn create_webhook(id: &str, form: Form<NewWebhook>, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.create_webhook(form.into_inner()));
    Ok(toast(result, api_keys_url(id), |w| format!("Webhook added for {}", w.url)))
}

#[post("/topics/<id>/settings/webhooks/<webhook_id>/toggle")]
fn toggle_webhook(id: &str, webhook_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.toggle_webhook(webhook_id));
    Ok(toast(result, api_keys_url(id), |w| {
        format!("Webhook {}", if w.enabled { "enabled" } else { "paused" })
    }))
}

#[post("/topics/<id>/settings/webhooks/<webhook_id>/delete")]
fn delete_webhook(id: &str, webhook_id: &str, user: Option<AuthUser>, api: &State<MockApi>) -> Action {
    signed_in(user)?;
    let result = api.update(id, |ws| ws.delete_webhook(webhook_id));
    Ok(toast(result, api_keys_url(id), |w| format!("Deleted webhook {}", w.url)))
}

pub fn routes() -> Vec<Route> {
    routes![
        index,
        login_page,
        login,
        logout,
        toggle_sidebar,
        projects_page,
        set_project_status,
        wizard_page,
        wizard_details,
        wizard_add_keyword,
        wizard_remove_keyword,
        wizard_next,
        wizard_back,
        wizard_submit,
        wizard_reset,
        topic_home,
        overview,
        trends,
        sentiment,
        geo,
        demographics,
        influencers,
        mentions,
        export_mentions,
        set_mention_sentiment,
        toggle_mention_handled,
        toggle_mention_flagged,
        comparison,
        reports,
        generate_report,
        brand_overview,
        brand_competitors,
        brand_content,
        settings_topic_config,
        settings_team,
        settings_notifications,
        settings_api_keys,
        config_details,
        config_add_keyword,
        config_remove_keyword,
        config_platforms,
        config_save,
        config_cancel,
        invite_member,
        change_role,
        remove_member,
        create_alert,
        toggle_alert,
        delete_alert,
        create_scheduled_report,
        toggle_scheduled_report,
        delete_scheduled_report,
        create_api_key,
        toggle_api_key,
        delete_api_key,
        create_webhook,
        toggle_webhook,
        delete_webhook,
    ]
}
