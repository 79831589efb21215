use super::{input_value, select_value};
use market_core::browse::{ListingFilters, ListingOrdering};
use market_core::models::Category;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FilterSidebarProps {
    pub categories: Vec<Category>,
    pub filters: ListingFilters,
    pub on_apply: Callback<ListingFilters>,
    pub on_clear: Callback<()>,
}

/// Raw sidebar inputs; committed to the view only on "Apply Filters".
#[derive(Clone, PartialEq, Default)]
struct SidebarDraft {
    category: String,
    min_price: String,
    max_price: String,
}

impl SidebarDraft {
    fn from_filters(filters: &ListingFilters) -> Self {
        let number = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        Self {
            category: filters.category.map(|c| c.to_string()).unwrap_or_default(),
            min_price: number(filters.min_price),
            max_price: number(filters.max_price),
        }
    }
}

#[function_component(FilterSidebar)]
pub fn filter_sidebar(props: &FilterSidebarProps) -> Html {
    let draft = use_state(|| SidebarDraft::from_filters(&props.filters));

    {
        let draft = draft.clone();
        use_effect_with(props.filters.clone(), move |filters| {
            draft.set(SidebarDraft::from_filters(filters));
        });
    }

    let on_category = {
        let draft = draft.clone();
        Callback::from(move |e: Event| {
            draft.set(SidebarDraft {
                category: select_value(&e),
                ..(*draft).clone()
            });
        })
    };
    let on_min = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            draft.set(SidebarDraft {
                min_price: input_value(&e),
                ..(*draft).clone()
            });
        })
    };
    let on_max = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            draft.set(SidebarDraft {
                max_price: input_value(&e),
                ..(*draft).clone()
            });
        })
    };

    let on_apply = {
        let draft = draft.clone();
        let current = props.filters.clone();
        let cb = props.on_apply.clone();
        Callback::from(move |_: MouseEvent| {
            let mut filters = current.clone();
            filters.set_category(&draft.category);
            filters.set_min_price(&draft.min_price);
            filters.set_max_price(&draft.max_price);
            cb.emit(filters);
        })
    };
    let on_clear = {
        let cb = props.on_clear.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };

    let has_active = !draft.category.is_empty()
        || !draft.min_price.is_empty()
        || !draft.max_price.is_empty();

    html! {
        <aside class="filter-sidebar">
            <div class="filter-sidebar-header">
                <h2>{ "Filters" }</h2>
            </div>

            <div class="filter-section">
                <label class="filter-label">{ "Category" }</label>
                <select class="filter-select" onchange={on_category}>
                    <option value="" selected={draft.category.is_empty()}>{ "All Categories" }</option>
                    { for props.categories.iter().map(|category| {
                        let value = category.id.to_string();
                        html! {
                            <option
                                key={category.id}
                                value={value.clone()}
                                selected={draft.category == value}
                            >
                                { &category.name }
                            </option>
                        }
                    }) }
                </select>
            </div>

            <div class="filter-section">
                <label class="filter-label">{ "Price Range" }</label>
                <div class="price-inputs">
                    <input
                        type="number"
                        class="filter-input"
                        placeholder="Min"
                        min="0"
                        value={draft.min_price.clone()}
                        oninput={on_min}
                    />
                    <span class="price-separator">{ "-" }</span>
                    <input
                        type="number"
                        class="filter-input"
                        placeholder="Max"
                        min="0"
                        value={draft.max_price.clone()}
                        oninput={on_max}
                    />
                </div>
            </div>

            <div class="filter-actions">
                <button class="filter-btn filter-btn-apply" onclick={on_apply}>
                    { "Apply Filters" }
                </button>
                if has_active || props.filters.has_active_filters() {
                    <button class="filter-btn filter-btn-clear" onclick={on_clear}>
                        { "Clear Filters" }
                    </button>
                }
            </div>
        </aside>
    }
}

#[derive(Properties, PartialEq)]
pub struct SortingDropdownProps {
    pub ordering: ListingOrdering,
    pub on_change: Callback<ListingOrdering>,
}

#[function_component(SortingDropdown)]
pub fn sorting_dropdown(props: &SortingDropdownProps) -> Html {
    let on_change = {
        let cb = props.on_change.clone();
        Callback::from(move |e: Event| {
            let ordering = ListingOrdering::from_param(&select_value(&e)).unwrap_or_default();
            cb.emit(ordering);
        })
    };

    html! {
        <div class="sorting-dropdown">
            <label class="sorting-label">{ "Sort by:" }</label>
            <select class="sorting-select" onchange={on_change}>
                { for ListingOrdering::ALL.iter().map(|ordering| html! {
                    <option
                        value={ordering.as_param()}
                        selected={*ordering == props.ordering}
                    >
                        { ordering.label() }
                    </option>
                }) }
            </select>
        </div>
    }
}
