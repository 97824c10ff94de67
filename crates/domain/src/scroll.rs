/// Index of the rendered entry whose visibility requests the next page.
///
/// Sits half a page before the end of the list so the next page is already
/// loading when the user reaches the bottom. `None` when nothing is left to
/// load or the list is empty.
#[must_use]
pub fn infinite_scroll_trigger_index(
    rendered_len: usize,
    page_size: u32,
    has_more: bool,
) -> Option<usize> {
    if !has_more || rendered_len == 0 {
        return None;
    }

    let page_size = usize::try_from(page_size).unwrap_or(usize::MAX);
    // floor(len - page_size / 2) computed in halves to stay in integers.
    let index = rendered_len.saturating_mul(2).saturating_sub(page_size) / 2;

    Some(index.min(rendered_len - 1))
}
