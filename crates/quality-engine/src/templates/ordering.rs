//! Contiguous `display_order` maintenance shared by every ordered configuration list.

/// Items that carry an explicit position inside their owning list.
pub trait Ordered {
    fn display_order(&self) -> u32;
    fn set_display_order(&mut self, order: u32);
}

/// Rewrite `display_order` so it equals array position.
pub fn renumber<T: Ordered>(items: &mut [T]) {
    renumber_each(items.iter_mut());
}

/// Renumber a filtered view, e.g. one category of a mixed list.
pub fn renumber_each<'a, T, I>(items: I)
where
    T: Ordered + 'a,
    I: IntoIterator<Item = &'a mut T>,
{
    for (position, item) in items.into_iter().enumerate() {
        item.set_display_order(position as u32);
    }
}

/// Swap the item at `index` with its predecessor. Returns `false` when already first.
pub fn move_up<T: Ordered>(items: &mut [T], index: usize) -> bool {
    if index == 0 || index >= items.len() {
        return false;
    }
    swap_positions(items, index - 1, index);
    true
}

/// Swap the item at `index` with its successor. Returns `false` when already last.
pub fn move_down<T: Ordered>(items: &mut [T], index: usize) -> bool {
    if index + 1 >= items.len() {
        return false;
    }
    swap_positions(items, index, index + 1);
    true
}

fn swap_positions<T: Ordered>(items: &mut [T], first: usize, second: usize) {
    items.swap(first, second);
    items[first].set_display_order(first as u32);
    items[second].set_display_order(second as u32);
}

/// Returns the first position whose `display_order` disagrees with its index.
pub fn first_out_of_order<'a, T, I>(items: I) -> Option<(usize, u32)>
where
    T: Ordered + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .enumerate()
        .find(|(position, item)| item.display_order() != *position as u32)
        .map(|(position, item)| (position, item.display_order()))
}

/// Case-insensitive key used for every uniqueness check on labels and names.
pub(crate) fn normalized_key(value: &str) -> String {
    value.trim().to_lowercase()
}
