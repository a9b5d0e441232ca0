use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::dashboard::insight_cache::REFLECTIONS_TITLE;
use crate::dashboard::{JobStatus, Markup, ModalId, NavItem, ScreenId, TabId};
use crate::error::DashboardError;
use crate::tui::element::LayoutConstraint as LC;
use crate::tui::resource::Resource;
use crate::tui::{Element, Layer, Theme};

use super::state::{BannerKind, InputTarget, MODAL_INPUT, Msg, SCREEN_INPUT, State};

pub fn render(state: &State, theme: &Theme) -> Element<Msg> {
    let mut column = Element::column(vec![nav_bar(state, theme)]);
    if let Some(banner) = &state.banner {
        let style = match banner.kind {
            BannerKind::Error => theme.error(),
            BannerKind::Notice => theme.notice(),
        };
        column = column.add(Element::styled(format!("{}  (esc to dismiss)", banner.text), style), LC::Length(1));
    }
    let body = column.add(screen_body(state, theme), LC::Fill(1)).spacing(1).build();

    let mut layers = vec![Layer::new(body)];
    for (index, modal) in state.modals.visible().into_iter().enumerate() {
        layers.push(Layer::new(modal_panel(state, modal, theme)).center().dim(index == 0));
    }
    Element::stack(layers)
}

fn nav_bar(state: &State, theme: &Theme) -> Element<Msg> {
    let mut spans = Vec::new();
    for item in NavItem::ALL {
        let style = if state.router.active_nav() == Some(item) { theme.active_nav() } else { theme.inactive_nav() };
        spans.push(Span::styled(format!(" {} ", item.label()), style));
        spans.push(Span::raw(" "));
    }
    if state.router.back_visible() {
        spans.push(Span::styled("⌫ Back", theme.muted()));
    }
    if state.router.current_screen().is_some_and(|s| s.is_lecture_view() || s == ScreenId::AddLecture) {
        spans.push(Span::styled(format!("  › {}", state.breadcrumb.current().label), theme.heading()));
    }
    Element::styled_text(Line::from(spans))
}

fn screen_body(state: &State, theme: &Theme) -> Element<Msg> {
    let content = state.router.content();
    let (Some(screen), Some(markup)) = (content.screen(), content.markup()) else {
        return Element::styled("Loading…", theme.muted());
    };

    let (template, data) = match screen {
        ScreenId::CourseHub => (course_hub_pane(state, markup, theme), course_hub_data(state, theme)),
        ScreenId::Home => (Element::text(markup.to_text()), home_data(state, theme)),
        ScreenId::Courses => (Element::text(markup.to_text()), course_list(state, theme)),
        ScreenId::AddLecture => (Element::text(markup.to_text()), add_lecture_data(state, theme)),
        ScreenId::LectureEdit => (Element::text(markup.to_text()), lecture_edit_data(state, theme)),
        ScreenId::LectureAnalysis => (Element::text(markup.to_text()), analysis_data(state, theme)),
        ScreenId::LecturePlanning => (Element::text(markup.to_text()), planning_data(state, theme)),
        ScreenId::Survey => (Element::text(markup.to_text()), survey_data(state, theme)),
    };

    Element::row(vec![
        Element::panel(template).title(screen.title()).build(),
        Element::panel(data).build(),
    ])
    .build()
}

fn resource_view<T>(resource: &Resource<T, DashboardError>, theme: &Theme, f: impl FnOnce(&T) -> Element<Msg>) -> Element<Msg> {
    match resource {
        Resource::NotAsked => Element::None,
        Resource::Loading => Element::styled("Loading…", theme.muted()),
        Resource::Failure(error) => Element::styled(error.user_message(), theme.error()),
        Resource::Success(data) => f(data),
    }
}

fn list_row(selected: bool, text: String, theme: &Theme) -> Element<Msg> {
    if selected {
        Element::styled(format!("› {}", text), theme.selected())
    } else {
        Element::text(format!("  {}", text))
    }
}

fn course_list(state: &State, theme: &Theme) -> Element<Msg> {
    resource_view(&state.courses, theme, |courses| {
        if courses.is_empty() {
            return Element::styled("No classes yet. Press a to add one.", theme.muted());
        }
        let rows = courses
            .iter()
            .enumerate()
            .map(|(i, course)| list_row(i == state.selected, course.display_name(), theme))
            .collect();
        Element::column(rows).build()
    })
}

fn home_data(state: &State, theme: &Theme) -> Element<Msg> {
    let pending = state
        .lectures
        .to_option()
        .map(|listing| listing.pending().count())
        .unwrap_or(0);
    let mut column = Element::column(vec![Element::styled("Your classes", theme.heading())]).add(course_list(state, theme), LC::Fill(1));
    if pending > 0 {
        column = column.add(
            Element::styled(format!("{} lecture analyses in progress", pending), theme.pending()),
            LC::Length(1),
        );
    }
    column.build()
}

fn course_hub_pane(state: &State, markup: &Markup, theme: &Theme) -> Element<Msg> {
    let active = state.tabs.active_tab(ScreenId::CourseHub).unwrap_or(TabId::Overview);
    let spans: Vec<Span<'static>> = TabId::ALL
        .iter()
        .flat_map(|tab| {
            let style = if *tab == active { theme.active_nav() } else { theme.inactive_nav() };
            [Span::styled(format!(" {} ", tab.label()), style), Span::raw(" ")]
        })
        .collect();
    let pane = markup
        .element_inner(&active.pane_id())
        .map(|inner| Markup::new(inner).to_text())
        .unwrap_or_default();
    Element::column(vec![Element::styled_text(Line::from(spans))])
        .add(Element::text(pane), LC::Fill(1))
        .build()
}

fn course_hub_data(state: &State, theme: &Theme) -> Element<Msg> {
    match state.tabs.active_tab(ScreenId::CourseHub) {
        Some(TabId::Lectures) => resource_view(&state.lectures, theme, |listing| {
            let mut rows = vec![Element::styled("Past lectures", theme.heading())];
            let mut index = 0;
            for lecture in &listing.past {
                rows.push(list_row(index == state.selected, lecture.title.clone(), theme));
                index += 1;
            }
            rows.push(Element::styled("Upcoming", theme.heading()));
            for lecture in &listing.upcoming {
                let text = if state.jobs.status(&lecture.id).is_in_flight() || lecture.is_analysis_pending() {
                    format!("{}  (analyzing…)", lecture.title)
                } else {
                    lecture.title.clone()
                };
                rows.push(list_row(index == state.selected, text, theme));
                index += 1;
            }
            Element::column(rows).build()
        }),
        Some(TabId::Assignments) => resource_view(&state.assignments, theme, |assignments| {
            if assignments.is_empty() {
                return Element::styled("No assignments. Press a to add one.", theme.muted());
            }
            let rows = assignments
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let due = a.due_date.as_deref().map(|d| format!(" (due {})", d)).unwrap_or_default();
                    list_row(i == state.selected, format!("{}{}", a.title, due), theme)
                })
                .collect();
            Element::column(rows).build()
        }),
        _ => Element::styled("1 overview · 2 lectures · 3 assignments", theme.muted()),
    }
}

fn screen_input(state: &State, target: InputTarget, placeholder: &str) -> Element<Msg> {
    let value = match &state.input {
        Some(input) if input.target == target => input.value.clone(),
        _ => String::new(),
    };
    Element::text_input(SCREEN_INPUT, value)
        .placeholder(placeholder)
        .on_change(Msg::InputKey)
        .on_submit(Msg::InputSubmitted)
        .build()
}

fn add_lecture_data(state: &State, _theme: &Theme) -> Element<Msg> {
    Element::column(vec![
        Element::text("Lecture title"),
        screen_input(state, InputTarget::LectureTitle, "press t, type a title, enter to create"),
    ])
    .build()
}

fn lecture_edit_data(state: &State, theme: &Theme) -> Element<Msg> {
    let session = state.router.session();
    let mut rows = vec![
        Element::text("Lecture video"),
        screen_input(state, InputTarget::VideoPath, "press v, type a file path, enter to stage"),
    ];
    match session.pending_video() {
        Some(video) => rows.push(Element::styled(format!("Staged: {}", video.file_name()), theme.notice())),
        None => rows.push(Element::styled("No video staged", theme.muted())),
    }

    if let Some(lecture_id) = session.current_lecture_id() {
        let status = state.jobs.status(lecture_id);
        match &status {
            JobStatus::Idle => {}
            JobStatus::Processing { message } => rows.push(Element::styled(
                message.clone().unwrap_or_else(|| "Analysis running in the background".to_string()),
                theme.pending(),
            )),
            JobStatus::Failed { error } => rows.push(Element::styled(error.user_message(), theme.error())),
            JobStatus::Submitting { .. } | JobStatus::Complete => {}
        }
        if let Some(percent) = state.jobs.progress(lecture_id, state.last_tick) {
            rows.push(Element::gauge(percent, format!("{} {}%", status.label(), percent)));
        }
    }
    Element::column(rows).build()
}

fn analysis_data(state: &State, theme: &Theme) -> Element<Msg> {
    let title = state.router.content().panel(REFLECTIONS_TITLE).map(|t| Markup::new(t).to_text());
    let analysis = resource_view(&state.analysis, theme, |analysis| {
        let mut rows = Vec::new();
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            rows.push(Element::styled(title, theme.heading()));
        }
        rows.push(Element::styled("Insights", theme.heading()));
        for (i, insight) in analysis.insights().iter().enumerate() {
            rows.push(list_row(i == state.selected, insight.title.clone(), theme));
        }
        let actions = analysis.action_items();
        if !actions.is_empty() {
            rows.push(Element::styled("Action items", theme.heading()));
            rows.extend(actions.into_iter().map(|a| Element::text(format!("[{}] {}", a.priority, a.item))));
        }
        let topics = analysis.topic_coverage();
        if !topics.is_empty() {
            rows.push(Element::styled("Topic coverage", theme.heading()));
            rows.extend(topics.into_iter().map(|t| {
                let mark = if t.covered { "✓" } else { "✗" };
                Element::text(format!("{} {}", mark, t.topic))
            }));
        }
        Element::column(rows).build()
    });
    let responses = resource_view(&state.reflections, theme, |responses| {
        Element::styled(format!("{} student responses", responses.len()), theme.muted())
    });
    Element::column(vec![]).add(analysis, LC::Fill(1)).add(responses, LC::Length(1)).build()
}

fn planning_data(state: &State, theme: &Theme) -> Element<Msg> {
    let materials = resource_view(&state.materials, theme, |materials| {
        if let Some(error) = &materials.error {
            return Element::styled(error.clone(), theme.error());
        }
        let mut rows = vec![Element::text(materials.summary.clone())];
        if !materials.learning_objectives.is_empty() {
            rows.push(Element::styled("Learning objectives", theme.heading()));
            rows.extend(materials.learning_objectives.iter().map(|o| Element::text(format!("• {}", o))));
        }
        if !materials.topics.is_empty() {
            rows.push(Element::styled("Topics", theme.heading()));
            rows.extend(materials.topics.iter().map(|t| Element::text(format!("• {}", t.name))));
        }
        Element::column(rows).build()
    });
    Element::column(vec![
        Element::text("Lecture materials"),
        screen_input(state, InputTarget::MaterialsPath, "press m, type a file path, enter to analyze"),
    ])
    .add(materials, LC::Fill(1))
    .build()
}

fn survey_data(state: &State, theme: &Theme) -> Element<Msg> {
    resource_view(&state.survey, theme, |survey| {
        let mut rows = vec![Element::styled(survey.lecture_title.clone(), theme.heading())];
        if !survey.summary.is_empty() {
            rows.push(Element::text(survey.summary.clone()));
        }
        rows.extend(
            survey
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| Element::text(format!("{}. {}", i + 1, q.question))),
        );
        Element::column(rows).build()
    })
}

fn modal_panel(state: &State, modal: ModalId, theme: &Theme) -> Element<Msg> {
    let text = state
        .modals
        .instance(modal)
        .map(|instance| instance.markup.to_text())
        .unwrap_or_default();
    let mut column = Element::column(vec![]).add(Element::text(text), LC::Fill(1));
    if let Some(input) = state.input.as_ref().filter(|i| i.target == InputTarget::Modal(modal)) {
        column = column.add(
            Element::text_input(MODAL_INPUT, input.value.clone())
                .on_change(Msg::InputKey)
                .on_submit(Msg::InputSubmitted)
                .build(),
            LC::Length(1),
        );
    }
    column = column.add(Element::styled("esc to close", Style::default().fg(theme.overlay0)), LC::Length(1));
    Element::panel(column.build()).title(modal.title()).build()
}
