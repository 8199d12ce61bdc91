use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewState, view_state_from_resource};
use crate::vm::list_quizzes;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut chosen = use_signal(|| None::<String>);

    let quiz_loop = ctx.quiz_loop();
    let mut resource = use_resource(move || {
        let quiz_loop = quiz_loop.clone();
        async move { list_quizzes(&quiz_loop).await }
    });
    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page home-page",
            h2 { "Choose a quiz" }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "banner banner--error", role: "alert",
                        p { "{err.message()}" }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| resource.restart(),
                            "Retry"
                        }
                    }
                },
                ViewState::Ready(quizzes) => {
                    let current = chosen().or_else(|| quizzes.first().cloned()).unwrap_or_default();
                    let start_id = current.clone();
                    rsx! {
                        div { class: "quiz-picker",
                            label { r#for: "quiz-select", "Quiz" }
                            select {
                                id: "quiz-select",
                                value: "{current}",
                                onchange: move |evt: FormEvent| chosen.set(Some(evt.value())),
                                for quiz_id in quizzes.iter() {
                                    option {
                                        key: "{quiz_id}",
                                        value: "{quiz_id}",
                                        selected: *quiz_id == current,
                                        "{quiz_id}"
                                    }
                                }
                            }
                            button {
                                class: "btn btn-primary",
                                id: "quiz-start",
                                r#type: "button",
                                onclick: move |_| {
                                    let _ = navigator.push(Route::Quiz { quiz_id: start_id.clone() });
                                },
                                "Start"
                            }
                        }
                    }
                }
            }
        }
    }
}
