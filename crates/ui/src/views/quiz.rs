use dioxus::prelude::*;
use dioxus_router::use_navigator;
use services::{QuizPhase, ReviewItem};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QuizIntent, QuizVm, start_quiz};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[component]
pub fn QuizView(quiz_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let quiz_loop = ctx.quiz_loop();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<QuizVm>);

    let quiz_loop_for_resource = quiz_loop.clone();
    let mut resource = use_resource(move || {
        let quiz_loop = quiz_loop_for_resource.clone();
        let quiz_id = quiz_id.clone();
        let mut error = error;
        let mut vm = vm;

        async move {
            let started = start_quiz(&quiz_loop, &quiz_id).await?;
            vm.set(Some(started));
            error.set(None);
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(resource);

    let dispatch_intent = {
        let quiz_loop = quiz_loop.clone();
        use_callback(move |intent: QuizIntent| {
            let mut error = error;
            let mut vm = vm;
            let mut guard = vm.write();
            let Some(vm_value) = guard.as_mut() else {
                error.set(Some(ViewError::Unknown));
                return;
            };

            let result = match intent {
                QuizIntent::Select(position) => {
                    vm_value.select(position);
                    Ok(())
                }
                QuizIntent::Next => vm_value.next(&quiz_loop),
                QuizIntent::Previous => {
                    vm_value.previous(&quiz_loop);
                    Ok(())
                }
                QuizIntent::Restart => {
                    vm_value.restart(&quiz_loop);
                    Ok(())
                }
            };
            error.set(result.err());
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    let vm_guard = vm.read();

    rsx! {
        div { class: "page quiz-page",
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
                        button {
                            class: "btn btn-ghost",
                            r#type: "button",
                            onclick: move |_| {
                                let _ = navigator.push(Route::Home {});
                            },
                            "Back to quizzes"
                        }
                    }
                },
                ViewState::Ready(()) => match vm_guard.as_ref() {
                    None => rsx! {
                        p { "Loading..." }
                    },
                    Some(quiz) => rsx! {
                        h2 { class: "quiz-title", "{quiz.title()}" }
                        if let Some(err) = *error.read() {
                            div { class: "banner banner--warning", role: "alert",
                                p { "{err.message()}" }
                            }
                        }
                        match quiz.phase() {
                            QuizPhase::Answering => rsx! {
                                QuestionCard {
                                    header: quiz.question_header().unwrap_or_default(),
                                    prompt: quiz.prompt().unwrap_or_default().to_string(),
                                    options: quiz.options().to_vec(),
                                    selected: quiz.selected(),
                                    progress: quiz.progress_label(),
                                    can_go_back: quiz.can_go_back(),
                                    on_intent: dispatch_intent,
                                }
                            },
                            QuizPhase::Completed => rsx! {
                                ResultsCard {
                                    score: quiz.score_label(),
                                    review: quiz.review(),
                                    on_intent: dispatch_intent,
                                }
                            },
                        }
                    },
                },
            }
        }
    }
}

#[component]
fn QuestionCard(
    header: String,
    prompt: String,
    options: Vec<String>,
    selected: Option<usize>,
    progress: String,
    can_go_back: bool,
    on_intent: EventHandler<QuizIntent>,
) -> Element {
    rsx! {
        div { class: "question",
            div { class: "question__meta",
                h3 { class: "question__header", "{header}" }
                span { class: "question__progress", "{progress}" }
            }
            p { class: "question__prompt", "{prompt}" }
            div { class: "question__options", role: "radiogroup",
                for (position, option) in options.iter().enumerate() {
                    label { key: "{position}", class: "question__option",
                        input {
                            r#type: "radio",
                            name: "answer",
                            id: "answer-{position}",
                            value: "{position}",
                            checked: selected == Some(position),
                            onchange: move |_| on_intent.call(QuizIntent::Select(position)),
                        }
                        span { "{option}" }
                    }
                }
            }
            div { class: "question__nav",
                button {
                    class: "btn btn-secondary",
                    id: "quiz-previous",
                    r#type: "button",
                    disabled: !can_go_back,
                    onclick: move |_| on_intent.call(QuizIntent::Previous),
                    "Previous"
                }
                button {
                    class: "btn btn-primary",
                    id: "quiz-next",
                    r#type: "button",
                    onclick: move |_| on_intent.call(QuizIntent::Next),
                    "Next"
                }
            }
        }
    }
}

#[component]
fn ResultsCard(score: String, review: Vec<ReviewItem>, on_intent: EventHandler<QuizIntent>) -> Element {
    rsx! {
        div { class: "results",
            h3 { class: "results__score", "{score}" }
            if !review.is_empty() {
                h4 { class: "results__review-title", "Review Incorrect Answers" }
                ul { class: "results__review",
                    for item in review.iter() {
                        ReviewEntry { key: "{item.index}", item: item.clone() }
                    }
                }
            }
            div { class: "results__actions",
                button {
                    class: "btn btn-secondary",
                    id: "quiz-back",
                    r#type: "button",
                    onclick: move |_| on_intent.call(QuizIntent::Previous),
                    "Previous"
                }
                button {
                    class: "btn btn-primary",
                    id: "quiz-restart",
                    r#type: "button",
                    onclick: move |_| on_intent.call(QuizIntent::Restart),
                    "Restart Quiz"
                }
            }
        }
    }
}

#[component]
fn ReviewEntry(item: ReviewItem) -> Element {
    let your_answer = item.your_answer.as_deref().unwrap_or("No answer");

    rsx! {
        li { class: "review-item",
            p { class: "review-item__question", "Question {item.number}: {item.prompt}" }
            ul { class: "review-item__options",
                for option in item.options.iter() {
                    li {
                        class: if *option == item.correct_answer { "review-item__option review-item__option--correct" } else { "review-item__option" },
                        "{option}"
                    }
                }
            }
            p { class: "review-item__yours", "Your answer: {your_answer}" }
            p { class: "review-item__correct", "Correct answer: {item.correct_answer}" }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<QuizVm>>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<QuizIntent>, vm: Signal<Option<QuizVm>>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<QuizVm>> {
        (*self.vm.borrow()).expect("quiz vm registered")
    }
}
