use super::bindings::{Action, HandlerRegistry};
use super::RetrievalState;
use crate::dashboard::components::{AssessmentEngine, ComponentRegistry, CriteriaGuide, Reporting};
use crate::dashboard::domain::{CharityProfile, QaItem, RetrievalRequest};
use crate::dashboard::format::{escape_html, format_date};
use crate::dashboard::markup::{div, span, Element, Node};

pub const SUBMIT_ID: &str = "submit-btn";
pub const RETRY_ID: &str = "retry-btn";
pub const CANCEL_ID: &str = "cancel-btn";

pub(crate) const RETRIEVE_PATH: &str = "/retrieve";
pub(crate) const RETRY_PATH: &str = "/retry";
pub(crate) const CANCEL_PATH: &str = "/cancel";

const TITLE: &str = "Enhanced Know-Your-Grantee (KYG) Analytics";

/// Builds the root subtree for one render pass, binding handlers as it goes.
pub(crate) fn render_root(
    state: &RetrievalState,
    form: &RetrievalRequest,
    components: &ComponentRegistry,
    handlers: &mut HandlerRegistry,
) -> Node {
    let payload = state.payload();

    let mut main = Element::new("main")
        .with_class("main-content")
        .child(form_section(state, form, handlers))
        .child(qa_section(payload.map(|payload| payload.qa_dashboard.as_slice())));

    if let RetrievalState::Failed { message } = state {
        main = main.child(failure_panel(message, handlers));
    }

    let mut app = div("app-container")
        .with_attr("data-state", state.label())
        .child(
            Element::new("header")
                .with_class("header")
                .child(Element::new("h1").text(TITLE)),
        )
        .child(main)
        .child(profile_section(payload.map(|payload| &payload.charity_profile)))
        .child(components.mount(CriteriaGuide::TAG, None));

    if let Some(payload) = payload {
        app = app
            .child(components.mount_with::<AssessmentEngine>(&payload.assessment_engine))
            .child(components.mount_with::<Reporting>(&payload.reporting));
    }

    app.into()
}

fn form_section(
    state: &RetrievalState,
    form: &RetrievalRequest,
    handlers: &mut HandlerRegistry,
) -> Element {
    let pending = state.is_pending();

    let identifier = div("form-group")
        .child(label("charity-name", "Charity Name or UEN"))
        .child(
            Element::new("input")
                .with_attr("type", "text")
                .with_id("charity-name")
                .with_attr("name", "charity_identifier")
                .with_attr("placeholder", "Enter Charity Name or UEN")
                .with_attr("value", form.charity_identifier.as_str())
                .with_flag("disabled", pending),
        );

    let documents = div("form-group")
        .child(label("documents", "Supporting Documents"))
        .child(
            Element::new("input")
                .with_attr("type", "file")
                .with_id("documents")
                .with_attr("name", "documents")
                .with_flag("multiple", true)
                .with_flag("disabled", pending),
        );

    let links = div("form-group")
        .child(label("links", "Links"))
        .child(
            Element::new("textarea")
                .with_id("links")
                .with_attr("name", "links")
                .with_attr("rows", "4")
                .with_attr("placeholder", "Paste relevant links here")
                .with_flag("disabled", pending)
                .text(form.links.as_str()),
        );

    let mut submit = Element::new("button")
        .with_class("btn")
        .with_id(SUBMIT_ID)
        .with_attr("type", "submit")
        .with_flag("disabled", pending);
    submit = if pending {
        submit
            .child(span("loader"))
            .child(Node::text(" Retrieving..."))
    } else {
        handlers.bind(SUBMIT_ID, Action::Submit);
        submit.text(Action::Submit.label())
    };

    let mut section = Element::new("section").with_class("form-section").child(
        Element::new("form")
            .with_id("retrieve-form")
            .with_attr("method", "post")
            .with_attr("action", RETRIEVE_PATH)
            .with_attr("enctype", "multipart/form-data")
            .child(identifier)
            .child(documents)
            .child(links)
            .child(submit),
    );

    if pending {
        handlers.bind(CANCEL_ID, Action::Cancel);
        section = section.child(action_form(CANCEL_PATH, CANCEL_ID, Action::Cancel));
    }

    section
}

fn failure_panel(message: &str, handlers: &mut HandlerRegistry) -> Element {
    handlers.bind(RETRY_ID, Action::Retry);
    div("retrieval-error")
        .with_attr("role", "alert")
        .child(Element::new("p").text(message))
        .child(action_form(RETRY_PATH, RETRY_ID, Action::Retry))
}

fn action_form(path: &str, id: &'static str, action: Action) -> Element {
    Element::new("form")
        .with_attr("method", "post")
        .with_attr("action", path)
        .child(
            Element::new("button")
                .with_class("btn")
                .with_id(id)
                .with_attr("type", "submit")
                .text(action.label()),
        )
}

fn label(target: &str, text: &str) -> Element {
    Element::new("label").with_attr("for", target).text(text)
}

fn qa_section(items: Option<&[QaItem]>) -> Element {
    let rows = items.unwrap_or_default().iter().map(|item| {
        div("qa-item")
            .child(Element::new("span").text(item.label.as_str()))
            .child(span(&format!("status {}", item.status.class())).text(item.status.label()))
    });

    Element::new("section")
        .with_class("dashboard-section")
        .child(Element::new("h2").text("Automated Data QA"))
        .child(Element::new("div").with_id("qa-dashboard").children(rows))
}

fn profile_section(profile: Option<&CharityProfile>) -> Element {
    let section = Element::new("section")
        .with_id("charity-data-display")
        .child(Element::new("h2").text("Charity Profile"));

    let Some(profile) = profile else {
        return section;
    };

    let rows = [
        ("Registration Date:", format_date(profile.registration_date)),
        ("Charity Status:", profile.charity_status.clone()),
        ("IPC Status:", profile.ipc_status.clone()),
        ("IPC Expiry:", format_date(profile.ipc_expiry)),
    ]
    .into_iter()
    .map(|(name, value)| {
        div("data-item")
            .child(span("data-label").text(name))
            .child(span("data-value").text(value))
    });

    section.child(div("data-grid").children(rows))
}

/// Wraps the root tree in a standalone document.
pub(crate) fn render_document(root: &Node, pending: bool) -> String {
    let mut html = String::from("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    if pending {
        html.push_str("<meta http-equiv=\"refresh\" content=\"1\">");
    }
    html.push_str("<title>");
    html.push_str(&escape_html(TITLE));
    html.push_str("</title></head><body>");
    html.push_str(&root.to_html());
    html.push_str("</body></html>");
    html
}
