use dioxus::prelude::*;
use dioxus_router::Router;

use crate::routes::Route;

/// Root component: stylesheet, window title and the quiz routes.
#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "Quiz App" }

        div { class: "quiz-app",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    section { class: "banner banner--error", role: "alert",
                        h2 { "The quiz app hit an unexpected error" }
                        pre { class: "fatal__details", "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
