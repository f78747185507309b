use crate::models::{Page, PageButton};

/// 总页数；空集合为 0 页
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// 将页码限制在 [1, max(1, total_pages)] 之内
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// 截取当前页，页码越界时返回空页而不报错
pub fn paginate<T: Clone>(collection: &[T], page_size: usize, current_page: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(collection.len(), page_size);

    let start = current_page.saturating_sub(1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(collection.len());

    let items = if start < collection.len() {
        collection[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page { items, total_pages }
}

/// 生成页码按钮：以当前页为中心的窗口，窗口外补首页、末页和省略号
pub fn page_buttons(current_page: usize, total_pages: usize, max_visible: usize) -> Vec<PageButton> {
    let mut buttons = Vec::new();
    if total_pages <= 1 {
        return buttons;
    }

    let max_visible = max_visible.max(1);
    let mut start = current_page.saturating_sub(max_visible / 2).max(1);
    let end = start.saturating_add(max_visible - 1).min(total_pages);
    if end - start < max_visible - 1 {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }

    let page = |number: usize| PageButton::Page {
        number,
        active: number == current_page,
    };

    if start > 1 {
        buttons.push(page(1));
        if start > 2 {
            buttons.push(PageButton::Ellipsis);
        }
    }

    buttons.extend((start..=end).map(page));

    if end < total_pages {
        if end < total_pages - 1 {
            buttons.push(PageButton::Ellipsis);
        }
        buttons.push(page(total_pages));
    }

    buttons
}
