use super::{field_error, PageProps};
use crate::components::input_value;
use crate::router::AppRoute;
use market_core::auth_form::{LoginForm, RegisterForm};
use market_core::error::{ApiError, FieldErrors, NON_FIELD_ERRORS};
use market_core::models::AuthResponse;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

/// Splits a failed auth call into per-field messages and a banner.
fn auth_failure(error: ApiError) -> (FieldErrors, Option<String>) {
    match error {
        ApiError::Validation(mut fields) => {
            let general = fields.remove(NON_FIELD_ERRORS);
            let banner = match general {
                Some(message) => Some(message),
                None if fields.is_empty() => Some("Invalid input".to_string()),
                None => None,
            };
            (fields, banner)
        }
        ApiError::Unauthorized(_) => (
            FieldErrors::new(),
            Some("Invalid username or password".to_string()),
        ),
        other => (FieldErrors::new(), Some(other.user_message())),
    }
}

fn view_banner(message: &Option<String>) -> Html {
    match message {
        Some(message) => html! { <div class="alert alert-error">{ message }</div> },
        None => html! {},
    }
}

pub enum LoginMsg {
    UpdateUsername(String),
    UpdatePassword(String),
    Submit,
    Succeeded(AuthResponse),
    Failed(ApiError),
}

pub struct LoginPage {
    form: LoginForm,
    errors: FieldErrors,
    banner: Option<String>,
    submitting: bool,
}

impl Component for LoginPage {
    type Message = LoginMsg;
    type Properties = PageProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            form: LoginForm::default(),
            errors: FieldErrors::new(),
            banner: None,
            submitting: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LoginMsg::UpdateUsername(val) => {
                self.form.username = val;
                self.errors.remove("username");
                true
            }
            LoginMsg::UpdatePassword(val) => {
                self.form.password = val;
                self.errors.remove("password");
                true
            }

            LoginMsg::Submit => {
                if self.submitting {
                    return false;
                }
                let req = match self.form.to_request() {
                    Ok(req) => req,
                    Err(errors) => {
                        self.errors = errors;
                        return true;
                    }
                };

                self.submitting = true;
                self.banner = None;

                let http = ctx.props().session.http();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match http.login(&req).await {
                        Ok(auth) => link.send_message(LoginMsg::Succeeded(auth)),
                        Err(e) => link.send_message(LoginMsg::Failed(e.into_api_error())),
                    }
                });
                true
            }

            LoginMsg::Succeeded(auth) => {
                self.submitting = false;
                ctx.props().session.on_auth.emit(auth);
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&AppRoute::Home);
                }
                false
            }

            LoginMsg::Failed(error) => {
                log::warn!("Login failed: {}", error);
                self.submitting = false;
                let (errors, banner) = auth_failure(error);
                self.errors = errors;
                self.banner = banner;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            LoginMsg::Submit
        });

        html! {
            <div class="auth-page">
                <div class="auth-card">
                    <h1>{ "Login" }</h1>
                    { view_banner(&self.banner) }
                    <form class="auth-form" {onsubmit}>
                        <div class="form-group">
                            <label class="form-label">{ "Username" }</label>
                            <input
                                type="text"
                                class="form-input"
                                value={self.form.username.clone()}
                                disabled={self.submitting}
                                oninput={link.callback(|e: InputEvent| LoginMsg::UpdateUsername(input_value(&e)))}
                            />
                            { field_error(self.errors.get("username")) }
                        </div>
                        <div class="form-group">
                            <label class="form-label">{ "Password" }</label>
                            <input
                                type="password"
                                class="form-input"
                                value={self.form.password.clone()}
                                disabled={self.submitting}
                                oninput={link.callback(|e: InputEvent| LoginMsg::UpdatePassword(input_value(&e)))}
                            />
                            { field_error(self.errors.get("password")) }
                        </div>
                        <button type="submit" class="btn btn-primary btn-block" disabled={self.submitting}>
                            { if self.submitting { "Logging in..." } else { "Login" } }
                        </button>
                    </form>
                    <p class="auth-switch">
                        { "Don't have an account? " }
                        <Link<AppRoute> to={AppRoute::Register}>{ "Register" }</Link<AppRoute>>
                    </p>
                </div>
            </div>
        }
    }
}

#[derive(Clone, Copy)]
pub enum RegisterField {
    Username,
    Email,
    Phone,
    Password,
    PasswordConfirm,
}

impl RegisterField {
    fn key(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Password => "password",
            Self::PasswordConfirm => "password_confirm",
        }
    }
}

pub enum RegisterMsg {
    Update(RegisterField, String),
    Submit,
    Succeeded(AuthResponse),
    Failed(ApiError),
}

pub struct RegisterPage {
    form: RegisterForm,
    errors: FieldErrors,
    banner: Option<String>,
    submitting: bool,
}

impl RegisterPage {
    fn view_input(
        &self,
        ctx: &Context<Self>,
        label: &'static str,
        input_type: &'static str,
        field: RegisterField,
    ) -> Html {
        let key = field.key();
        let value = match field {
            RegisterField::Username => self.form.username.clone(),
            RegisterField::Email => self.form.email.clone(),
            RegisterField::Phone => self.form.phone.clone(),
            RegisterField::Password => self.form.password.clone(),
            RegisterField::PasswordConfirm => self.form.password_confirm.clone(),
        };
        let oninput = ctx
            .link()
            .callback(move |e: InputEvent| RegisterMsg::Update(field, input_value(&e)));

        html! {
            <div class="form-group">
                <label class="form-label">{ label }</label>
                <input
                    type={input_type}
                    class="form-input"
                    {value}
                    disabled={self.submitting}
                    {oninput}
                />
                { field_error(self.errors.get(key)) }
            </div>
        }
    }
}

impl Component for RegisterPage {
    type Message = RegisterMsg;
    type Properties = PageProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            form: RegisterForm::default(),
            errors: FieldErrors::new(),
            banner: None,
            submitting: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            RegisterMsg::Update(field, val) => {
                self.errors.remove(field.key());
                match field {
                    RegisterField::Username => self.form.username = val,
                    RegisterField::Email => self.form.email = val,
                    RegisterField::Phone => self.form.phone = val,
                    RegisterField::Password => self.form.password = val,
                    RegisterField::PasswordConfirm => self.form.password_confirm = val,
                }
                true
            }

            RegisterMsg::Submit => {
                if self.submitting {
                    return false;
                }
                let req = match self.form.to_request() {
                    Ok(req) => req,
                    Err(errors) => {
                        self.errors = errors;
                        return true;
                    }
                };

                self.submitting = true;
                self.banner = None;

                let http = ctx.props().session.http();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match http.register(&req).await {
                        Ok(auth) => link.send_message(RegisterMsg::Succeeded(auth)),
                        Err(e) => link.send_message(RegisterMsg::Failed(e.into_api_error())),
                    }
                });
                true
            }

            RegisterMsg::Succeeded(auth) => {
                self.submitting = false;
                ctx.props().session.on_auth.emit(auth);
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&AppRoute::Home);
                }
                false
            }

            RegisterMsg::Failed(error) => {
                log::warn!("Registration failed: {}", error);
                self.submitting = false;
                let (errors, banner) = auth_failure(error);
                self.errors = errors;
                self.banner = banner;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            RegisterMsg::Submit
        });

        html! {
            <div class="auth-page">
                <div class="auth-card">
                    <h1>{ "Register" }</h1>
                    { view_banner(&self.banner) }
                    <form class="auth-form" {onsubmit}>
                        { self.view_input(ctx, "Username *", "text", RegisterField::Username) }
                        { self.view_input(ctx, "Email *", "email", RegisterField::Email) }
                        { self.view_input(ctx, "Phone", "tel", RegisterField::Phone) }
                        { self.view_input(ctx, "Password *", "password", RegisterField::Password) }
                        { self.view_input(ctx, "Confirm Password *", "password", RegisterField::PasswordConfirm) }
                        <button type="submit" class="btn btn-primary btn-block" disabled={self.submitting}>
                            { if self.submitting { "Creating account..." } else { "Register" } }
                        </button>
                    </form>
                    <p class="auth-switch">
                        { "Already have an account? " }
                        <Link<AppRoute> to={AppRoute::Login}>{ "Login" }</Link<AppRoute>>
                    </p>
                </div>
            </div>
        }
    }
}
