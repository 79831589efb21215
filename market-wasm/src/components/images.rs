use crate::api::media_url;
use market_core::models::ListingImage;
use web_sys::{File, FileList, HtmlInputElement};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ImageSliderProps {
    pub images: Vec<ListingImage>,
    #[prop_or_default]
    pub alt: AttrValue,
}

#[function_component(ImageSlider)]
pub fn image_slider(props: &ImageSliderProps) -> Html {
    let index = use_state(|| 0usize);
    let count = props.images.len();

    if count == 0 {
        return html! {
            <div class="image-slider image-slider-empty">
                <div class="no-image-placeholder">{ "No images" }</div>
            </div>
        };
    }

    let current = (*index).min(count - 1);
    let on_prev = {
        let index = index.clone();
        Callback::from(move |_: MouseEvent| index.set((current + count - 1) % count))
    };
    let on_next = {
        let index = index.clone();
        Callback::from(move |_: MouseEvent| index.set((current + 1) % count))
    };

    html! {
        <div class="image-slider">
            <div class="image-slider-main">
                <img
                    src={media_url(&props.images[current].image)}
                    alt={props.alt.clone()}
                    class="image-slider-image"
                />
                if count > 1 {
                    <button class="image-slider-nav image-slider-prev" onclick={on_prev}>{ "‹" }</button>
                    <button class="image-slider-nav image-slider-next" onclick={on_next}>{ "›" }</button>
                    <div class="image-slider-counter">{ format!("{} / {}", current + 1, count) }</div>
                }
            </div>
            if count > 1 {
                <div class="image-slider-thumbnails">
                    { for props.images.iter().enumerate().map(|(i, image)| {
                        let index = index.clone();
                        html! {
                            <img
                                key={image.id}
                                src={media_url(&image.image)}
                                class={classes!("image-slider-thumbnail", (i == current).then_some("active"))}
                                onclick={move |_: MouseEvent| index.set(i)}
                            />
                        }
                    }) }
                </div>
            }
        </div>
    }
}

/// One tile in the picker grid.
#[derive(Clone, PartialEq)]
pub struct PickerPreview {
    pub url: AttrValue,
    pub name: AttrValue,
    pub is_new: bool,
}

#[derive(Properties, PartialEq)]
pub struct ImagePickerProps {
    pub previews: Vec<PickerPreview>,
    pub max: usize,
    pub on_files: Callback<Vec<File>>,
    pub on_remove: Callback<usize>,
    #[prop_or_default]
    pub messages: Vec<String>,
    #[prop_or_default]
    pub error: Option<AttrValue>,
    #[prop_or(false)]
    pub disabled: bool,
}

fn collect_files(list: Option<FileList>) -> Vec<File> {
    list.map(|list| (0..list.length()).filter_map(|i| list.get(i)).collect())
        .unwrap_or_default()
}

#[function_component(ImagePicker)]
pub fn image_picker(props: &ImagePickerProps) -> Html {
    let dragging = use_state(|| false);
    let remaining = props.max.saturating_sub(props.previews.len());
    let full = remaining == 0 || props.disabled;

    let on_change = {
        let cb = props.on_files.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let files = collect_files(input.files());
            // Lets the same file be picked again after removal.
            input.set_value("");
            if !files.is_empty() {
                cb.emit(files);
            }
        })
    };

    let on_drag_over = {
        let dragging = dragging.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            if !full {
                dragging.set(true);
            }
        })
    };
    let on_drag_leave = {
        let dragging = dragging.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            dragging.set(false);
        })
    };
    let on_drop = {
        let dragging = dragging.clone();
        let cb = props.on_files.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            dragging.set(false);
            if full {
                return;
            }
            let files = collect_files(e.data_transfer().and_then(|dt| dt.files()));
            if !files.is_empty() {
                cb.emit(files);
            }
        })
    };

    html! {
        <div class="image-picker">
            <label class="form-label">{ "Images *" }</label>
            <div
                class={classes!("image-drop-zone", dragging.then_some("dragging"), full.then_some("disabled"))}
                ondragover={on_drag_over}
                ondragleave={on_drag_leave}
                ondrop={on_drop}
            >
                <p>{ "Drag and drop images here, or" }</p>
                <label class="image-picker-browse">
                    { "Browse files" }
                    <input
                        type="file"
                        accept="image/*"
                        multiple=true
                        disabled={full}
                        onchange={on_change}
                        style="display: none;"
                    />
                </label>
                <p class="image-picker-hint">
                    { format!("{} of {} images, {} remaining. Max 5MB each.", props.previews.len(), props.max, remaining) }
                </p>
            </div>

            { for props.messages.iter().map(|message| html! {
                <div class="image-picker-warning">{ message }</div>
            }) }
            if let Some(error) = props.error.clone() {
                <span class="form-error">{ error }</span>
            }

            if !props.previews.is_empty() {
                <div class="image-preview-grid">
                    { for props.previews.iter().enumerate().map(|(i, preview)| {
                        let on_remove = props.on_remove.clone();
                        html! {
                            <div class="image-preview">
                                <img src={preview.url.clone()} alt={preview.name.clone()} />
                                if preview.is_new {
                                    <span class="image-preview-badge">{ "New" }</span>
                                }
                                <button
                                    type="button"
                                    class="image-preview-remove"
                                    disabled={props.disabled}
                                    onclick={move |_: MouseEvent| on_remove.emit(i)}
                                >
                                    { "×" }
                                </button>
                            </div>
                        }
                    }) }
                </div>
            }
        </div>
    }
}
