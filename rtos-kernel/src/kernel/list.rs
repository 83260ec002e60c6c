//! Ordered, circular, doubly linked lists kept in one arena.
//!
//! Every list has a sentinel node holding the largest possible key, so a
//! sorted insert always stops before it. Items and lists are referenced by
//! index, which keeps removal O(1) without self-referential pointers.

use alloc2::vec::Vec;

use crate::config::TickType;
use crate::kernel_assert;

/// Index of a list header inside a [`ListArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(u32);

/// Index of a list node inside a [`ListArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(u32);

impl ItemId {
  #[inline]
  const fn index(self) -> usize {
    self.0 as usize
  }
}

impl ListId {
  #[inline]
  const fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Debug)]
struct Node<O> {
  value: TickType,
  owner: Option<O>,
  container: Option<ListId>,
  next: ItemId,
  prev: ItemId,
}

#[derive(Debug)]
struct Header {
  sentinel: ItemId,
  cursor: ItemId,
  len: usize,
}

/// Storage for any number of lists whose items are owned by an `O`.
#[derive(Debug)]
pub struct ListArena<O> {
  nodes: Vec<Node<O>>,
  free_nodes: Vec<ItemId>,
  lists: Vec<Option<Header>>,
  free_lists: Vec<ListId>,
}

impl<O: Copy> ListArena<O> {
  pub const fn new() -> Self {
    Self { nodes: Vec::new(), free_nodes: Vec::new(), lists: Vec::new(), free_lists: Vec::new() }
  }

  fn alloc_node(&mut self, value: TickType, owner: Option<O>) -> ItemId {
    if let Some(id) = self.free_nodes.pop() {
      let node = &mut self.nodes[id.index()];
      node.value = value;
      node.owner = owner;
      node.container = None;
      node.next = id;
      node.prev = id;
      return id
    }

    let id = ItemId(self.nodes.len() as u32);
    self.nodes.push(Node { value, owner, container: None, next: id, prev: id });
    id
  }

  #[inline]
  fn header(&self, list: ListId) -> &Header {
    match self.lists.get(list.index()).and_then(Option::as_ref) {
      Some(header) => header,
      None => crate::assert::assert_failed("use of a released list", file!(), line!()),
    }
  }

  #[inline]
  fn header_mut(&mut self, list: ListId) -> &mut Header {
    match self.lists.get_mut(list.index()).and_then(Option::as_mut) {
      Some(header) => header,
      None => crate::assert::assert_failed("use of a released list", file!(), line!()),
    }
  }

  /// Create an empty list.
  pub fn new_list(&mut self) -> ListId {
    let sentinel = self.alloc_node(TickType::MAX, None);
    let header = Header { sentinel, cursor: sentinel, len: 0 };

    let id = if let Some(id) = self.free_lists.pop() {
      self.lists[id.index()] = Some(header);
      id
    } else {
      self.lists.push(Some(header));
      ListId(self.lists.len() as u32 - 1)
    };

    self.nodes[sentinel.index()].container = Some(id);
    id
  }

  /// Release an empty list.
  pub fn release_list(&mut self, list: ListId) {
    let header = self.header(list);
    kernel_assert!(header.len == 0, "release of a non-empty list");
    let sentinel = header.sentinel;

    self.nodes[sentinel.index()].container = None;
    self.free_nodes.push(sentinel);
    self.lists[list.index()] = None;
    self.free_lists.push(list);
  }

  /// Create a detached item owned by `owner`.
  pub fn new_item(&mut self, owner: O) -> ItemId {
    self.alloc_node(0, Some(owner))
  }

  /// Release a detached item.
  pub fn release_item(&mut self, item: ItemId) {
    let node = &mut self.nodes[item.index()];
    kernel_assert!(node.owner.is_some(), "release of a list sentinel");
    kernel_assert!(node.container.is_none(), "release of an item still in a list");
    node.owner = None;
    self.free_nodes.push(item);
  }

  #[inline]
  pub fn value(&self, item: ItemId) -> TickType {
    self.nodes[item.index()].value
  }

  #[inline]
  pub fn set_value(&mut self, item: ItemId, value: TickType) {
    self.nodes[item.index()].value = value;
  }

  #[inline]
  pub fn container(&self, item: ItemId) -> Option<ListId> {
    self.nodes[item.index()].container
  }

  #[inline]
  pub fn is_listed(&self, item: ItemId) -> bool {
    self.container(item).is_some()
  }

  pub fn owner(&self, item: ItemId) -> O {
    match self.nodes[item.index()].owner {
      Some(owner) => owner,
      None => crate::assert::assert_failed("list sentinel has no owner", file!(), line!()),
    }
  }

  #[inline]
  pub fn len(&self, list: ListId) -> usize {
    self.header(list).len
  }

  #[inline]
  pub fn is_empty(&self, list: ListId) -> bool {
    self.len(list) == 0
  }

  pub fn contains(&self, list: ListId, item: ItemId) -> bool {
    self.container(item) == Some(list)
  }

  /// First item, i.e. the one with the smallest key.
  pub fn head(&self, list: ListId) -> Option<ItemId> {
    let header = self.header(list);
    let first = self.nodes[header.sentinel.index()].next;
    (first != header.sentinel).then_some(first)
  }

  pub fn head_owner(&self, list: ListId) -> Option<O> {
    self.head(list).map(|item| self.owner(item))
  }

  pub fn head_value(&self, list: ListId) -> Option<TickType> {
    self.head(list).map(|item| self.value(item))
  }

  fn link_after(&mut self, list: ListId, after: ItemId, item: ItemId) {
    let next = self.nodes[after.index()].next;
    {
      let node = &mut self.nodes[item.index()];
      node.next = next;
      node.prev = after;
      node.container = Some(list);
    }
    self.nodes[next.index()].prev = item;
    self.nodes[after.index()].next = item;
    self.header_mut(list).len += 1;
  }

  /// Insert `item` in ascending key order, after any items with an equal key.
  pub fn insert(&mut self, list: ListId, item: ItemId) {
    kernel_assert!(!self.is_listed(item), "insert of an item already in a list");

    let value = self.value(item);
    let sentinel = self.header(list).sentinel;

    let after = if value == TickType::MAX {
      self.nodes[sentinel.index()].prev
    } else {
      let mut iter = sentinel;
      loop {
        let next = self.nodes[iter.index()].next;
        if self.nodes[next.index()].value > value {
          break iter
        }
        iter = next;
      }
    };

    self.link_after(list, after, item);
  }

  /// Insert `item` immediately before the sentinel, ignoring its key.
  pub fn insert_end(&mut self, list: ListId, item: ItemId) {
    kernel_assert!(!self.is_listed(item), "insert of an item already in a list");

    let sentinel = self.header(list).sentinel;
    let last = self.nodes[sentinel.index()].prev;
    self.link_after(list, last, item);
  }

  /// Unlink `item` from its list, returning the number of items left in it.
  pub fn remove(&mut self, item: ItemId) -> usize {
    let Some(list) = self.container(item) else {
      crate::assert::assert_failed("remove of an item that is not in a list", file!(), line!())
    };

    let Node { next, prev, .. } = self.nodes[item.index()];
    kernel_assert!(
      self.nodes[prev.index()].next == item && self.nodes[next.index()].prev == item,
      "list links corrupted",
    );

    self.nodes[prev.index()].next = next;
    self.nodes[next.index()].prev = prev;

    let node = &mut self.nodes[item.index()];
    node.container = None;
    node.next = item;
    node.prev = item;

    let header = self.header_mut(list);
    if header.cursor == item {
      header.cursor = prev;
    }
    header.len -= 1;
    header.len
  }

  /// Move the round-robin cursor to the next item, skipping the sentinel,
  /// and return its owner.
  pub fn next_owner(&mut self, list: ListId) -> Option<O> {
    let header = self.header(list);
    if header.len == 0 {
      return None
    }

    let sentinel = header.sentinel;
    let mut cursor = self.nodes[header.cursor.index()].next;
    if cursor == sentinel {
      cursor = self.nodes[cursor.index()].next;
    }
    self.header_mut(list).cursor = cursor;

    Some(self.owner(cursor))
  }

  /// Owner of the item under the cursor, if the cursor is on an item.
  pub fn cursor_owner(&self, list: ListId) -> Option<O> {
    let header = self.header(list);
    (header.cursor != header.sentinel).then(|| self.owner(header.cursor))
  }

  /// Iterate over `(item, owner)` pairs from head to tail.
  pub fn iter(&self, list: ListId) -> Iter<'_, O> {
    let sentinel = self.header(list).sentinel;
    Iter { arena: self, sentinel, next: self.nodes[sentinel.index()].next }
  }

  /// Collect the owners of `list` from head to tail.
  pub fn owners(&self, list: ListId) -> Vec<O> {
    self.iter(list).map(|(_, owner)| owner).collect()
  }
}

impl<O: Copy> Default for ListArena<O> {
  fn default() -> Self {
    Self::new()
  }
}

pub struct Iter<'a, O> {
  arena: &'a ListArena<O>,
  sentinel: ItemId,
  next: ItemId,
}

impl<O: Copy> Iterator for Iter<'_, O> {
  type Item = (ItemId, O);

  fn next(&mut self) -> Option<Self::Item> {
    if self.next == self.sentinel {
      return None
    }

    let item = self.next;
    self.next = self.arena.nodes[item.index()].next;
    Some((item, self.arena.owner(item)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(arena: &mut ListArena<char>, owner: char, value: TickType) -> ItemId {
    let item = arena.new_item(owner);
    arena.set_value(item, value);
    item
  }

  #[test]
  fn insert_keeps_ascending_order_and_fifo_among_equals() {
    let mut arena = ListArena::new();
    let list = arena.new_list();

    for (owner, value) in [('a', 30), ('b', 10), ('c', 20), ('d', 10), ('e', 30)] {
      let i = item(&mut arena, owner, value);
      arena.insert(list, i);
    }

    assert_eq!(arena.owners(list), ['b', 'd', 'c', 'a', 'e']);
    assert_eq!(arena.head_value(list), Some(10));
  }

  #[test]
  fn max_key_goes_last() {
    let mut arena = ListArena::new();
    let list = arena.new_list();

    let forever = item(&mut arena, 'x', TickType::MAX);
    arena.insert(list, forever);
    let soon = item(&mut arena, 'y', 5);
    arena.insert(list, soon);

    assert_eq!(arena.owners(list), ['y', 'x']);
  }

  #[test]
  fn insert_end_ignores_key() {
    let mut arena = ListArena::new();
    let list = arena.new_list();

    let late = item(&mut arena, 'a', 100);
    arena.insert(list, late);
    let early = item(&mut arena, 'b', 1);
    arena.insert_end(list, early);

    assert_eq!(arena.owners(list), ['a', 'b']);
  }

  #[test]
  fn insert_then_remove_items() {
    let mut arena = ListArena::new();
    let list = arena.new_list();

    let items: Vec<_> = [('1', 40), ('2', 60), ('3', 50)]
      .into_iter()
      .map(|(owner, value)| item(&mut arena, owner, value))
      .collect();
    for &i in &items {
      arena.insert(list, i);
    }
    assert_eq!(arena.owners(list), ['1', '3', '2']);

    assert_eq!(arena.remove(items[2]), 2);
    assert!(!arena.is_listed(items[2]));
    assert_eq!(arena.owners(list), ['1', '2']);

    arena.insert_end(list, items[2]);
    assert_eq!(arena.owners(list), ['1', '2', '3']);
    assert_eq!(arena.len(list), 3);
  }

  #[test]
  fn cursor_wraps_past_sentinel() {
    let mut arena = ListArena::new();
    let list = arena.new_list();
    assert_eq!(arena.next_owner(list), None);

    for owner in ['a', 'b', 'c'] {
      let i = arena.new_item(owner);
      arena.insert_end(list, i);
    }

    let seen: Vec<_> = (0..7).filter_map(|_| arena.next_owner(list)).collect();
    assert_eq!(seen, ['a', 'b', 'c', 'a', 'b', 'c', 'a']);
  }

  #[test]
  fn removing_cursor_item_keeps_rotation() {
    let mut arena = ListArena::new();
    let list = arena.new_list();
    let a = arena.new_item('a');
    let b = arena.new_item('b');
    let c = arena.new_item('c');
    for i in [a, b, c] {
      arena.insert_end(list, i);
    }

    assert_eq!(arena.next_owner(list), Some('a'));
    assert_eq!(arena.next_owner(list), Some('b'));
    arena.remove(b);
    assert_eq!(arena.cursor_owner(list), Some('a'));
    assert_eq!(arena.next_owner(list), Some('c'));
  }

  #[test]
  fn released_nodes_are_reused() {
    let mut arena = ListArena::new();
    let list = arena.new_list();
    let a = arena.new_item('a');
    arena.insert_end(list, a);
    arena.remove(a);
    arena.release_item(a);

    let b = arena.new_item('b');
    assert_eq!(a, b);
    assert_eq!(arena.owner(b), 'b');

    arena.release_item(b);
    arena.release_list(list);
    let again = arena.new_list();
    assert_eq!(again, list);
    assert!(arena.is_empty(again));
  }

  #[test]
  #[should_panic(expected = "not in a list")]
  fn removing_detached_item_is_fatal() {
    let mut arena = ListArena::new();
    let a = arena.new_item('a');
    arena.remove(a);
  }

  #[test]
  #[should_panic(expected = "already in a list")]
  fn double_insert_is_fatal() {
    let mut arena = ListArena::new();
    let list = arena.new_list();
    let a = arena.new_item('a');
    arena.insert_end(list, a);
    arena.insert_end(list, a);
  }
}
