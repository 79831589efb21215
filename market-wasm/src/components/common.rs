use yew::prelude::*;

#[function_component(LoadingSpinner)]
pub fn loading_spinner() -> Html {
    html! {
        <div class="loading-spinner-container">
            <div class="loading-spinner"></div>
        </div>
    }
}

#[function_component(Footer)]
pub fn footer() -> Html {
    html! {
        <footer class="footer">
            <p>{ "ClassifiedsBoard - buy and sell locally" }</p>
        </footer>
    }
}

#[derive(Properties, PartialEq)]
pub struct ErrorMessageProps {
    pub message: AttrValue,
    #[prop_or_default]
    pub on_retry: Option<Callback<()>>,
}

/// Inline error banner with an optional manual retry.
#[function_component(ErrorMessage)]
pub fn error_message(props: &ErrorMessageProps) -> Html {
    html! {
        <div class="error-message">
            <span class="error-message-icon">{ "⚠️" }</span>
            <p class="error-message-text">{ props.message.clone() }</p>
            if let Some(on_retry) = props.on_retry.clone() {
                <button class="error-message-retry" onclick={move |_| on_retry.emit(())}>
                    { "Try Again" }
                </button>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ConfirmModalProps {
    pub title: AttrValue,
    pub message: AttrValue,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
    #[prop_or(AttrValue::from("Confirm"))]
    pub confirm_label: AttrValue,
    #[prop_or(false)]
    pub destructive: bool,
    #[prop_or(false)]
    pub busy: bool,
}

/// Rendered only while a confirmation is pending; the caller decides when.
#[function_component(ConfirmModal)]
pub fn confirm_modal(props: &ConfirmModalProps) -> Html {
    let on_cancel = {
        let cb = props.on_cancel.clone();
        let busy = props.busy;
        Callback::from(move |_: MouseEvent| {
            if !busy {
                cb.emit(())
            }
        })
    };
    let on_confirm = {
        let cb = props.on_confirm.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    let confirm_class = classes!(
        "confirm-modal-button",
        "confirm-modal-button-confirm",
        props.destructive.then_some("destructive")
    );

    html! {
        <div class="confirm-modal-overlay" onclick={on_cancel.clone()}>
            <div class="confirm-modal" onclick={|e: MouseEvent| e.stop_propagation()}>
                <h2 class="confirm-modal-title">{ props.title.clone() }</h2>
                <p class="confirm-modal-message">{ props.message.clone() }</p>
                <div class="confirm-modal-actions">
                    <button
                        class="confirm-modal-button confirm-modal-button-cancel"
                        onclick={on_cancel}
                        disabled={props.busy}
                    >
                        { "Cancel" }
                    </button>
                    <button class={confirm_class} onclick={on_confirm} disabled={props.busy}>
                        { if props.busy { "Working...".into() } else { props.confirm_label.clone() } }
                    </button>
                </div>
            </div>
        </div>
    }
}
