//! The widget tree maintained by a window host.

use std::sync::Arc;

use ahash::AHashMap;
use figures::units::Px;
use figures::Rect;
use parking_lot::Mutex;

use crate::styles::{Component, ComponentName};
use crate::value::CallbackHandle;
use crate::widget::{WidgetId, WidgetInstance};

/// The hierarchy of mounted widgets in a window, along with per-widget layout
/// and the change-callback handles registered on the widgets' behalf.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tree(Arc<Mutex<TreeData>>);

#[derive(Debug, Default)]
struct TreeData {
    nodes: AHashMap<WidgetId, Node>,
    root: Option<WidgetId>,
    active: Option<WidgetId>,
    hovered: Option<WidgetId>,
    pending_activation: Option<Option<WidgetId>>,
}

#[derive(Debug)]
struct Node {
    instance: WidgetInstance,
    parent: Option<WidgetId>,
    children: Vec<WidgetId>,
    layout: Option<Rect<Px>>,
    tracked: Vec<CallbackHandle>,
}

impl Tree {
    pub fn mount(&self, instance: WidgetInstance, parent: Option<WidgetId>) -> MountedWidget {
        let id = instance.id();
        let mut data = self.0.lock();
        data.nodes.insert(
            id,
            Node {
                instance: instance.clone(),
                parent,
                children: Vec::new(),
                layout: None,
                tracked: Vec::new(),
            },
        );
        match parent {
            Some(parent) => {
                if let Some(parent) = data.nodes.get_mut(&parent) {
                    parent.children.push(id);
                }
            }
            None => data.root = Some(id),
        }
        tracing::debug!(widget = ?id, "widget mounted");
        MountedWidget {
            id,
            instance,
            tree: self.clone(),
        }
    }

    /// Removes `id`, detaching it from its parent and dropping any tracked
    /// callback handles. Returns the removed instance and the ids of its
    /// children, which the caller is responsible for unmounting.
    pub fn remove(&self, id: WidgetId) -> Option<(WidgetInstance, Vec<WidgetId>)> {
        let mut data = self.0.lock();
        let node = data.nodes.remove(&id)?;
        if let Some(parent) = node.parent.and_then(|parent| data.nodes.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }
        if data.root == Some(id) {
            data.root = None;
        }
        if data.active == Some(id) {
            data.active = None;
        }
        if data.hovered == Some(id) {
            data.hovered = None;
        }
        tracing::debug!(widget = ?id, "widget unmounted");
        Some((node.instance, node.children))
    }

    pub fn widget(&self, id: WidgetId) -> Option<MountedWidget> {
        let data = self.0.lock();
        data.nodes.get(&id).map(|node| MountedWidget {
            id,
            instance: node.instance.clone(),
            tree: self.clone(),
        })
    }

    pub fn root(&self) -> Option<MountedWidget> {
        let root = self.0.lock().root?;
        self.widget(root)
    }

    pub fn children_of(&self, id: WidgetId) -> Vec<MountedWidget> {
        let data = self.0.lock();
        let Some(node) = data.nodes.get(&id) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter_map(|child| {
                data.nodes.get(child).map(|node| MountedWidget {
                    id: *child,
                    instance: node.instance.clone(),
                    tree: self.clone(),
                })
            })
            .collect()
    }

    pub fn set_layout(&self, id: WidgetId, layout: Rect<Px>) {
        if let Some(node) = self.0.lock().nodes.get_mut(&id) {
            node.layout = Some(layout);
        }
    }

    pub fn layout_of(&self, id: WidgetId) -> Option<Rect<Px>> {
        self.0.lock().nodes.get(&id).and_then(|node| node.layout)
    }

    /// Returns `id`'s layout in window coordinates by accumulating ancestor
    /// origins.
    pub fn layout_in_window(&self, id: WidgetId) -> Option<Rect<Px>> {
        let data = self.0.lock();
        let mut layout = data.nodes.get(&id)?.layout?;
        let mut current = data.nodes.get(&id)?.parent;
        while let Some(id) = current {
            let node = data.nodes.get(&id)?;
            if let Some(parent_layout) = node.layout {
                layout.origin = layout.origin + parent_layout.origin;
            }
            current = node.parent;
        }
        Some(layout)
    }

    /// Stores `handle` so that it is dropped when `id` unmounts. If `id` is
    /// not mounted, the handle is dropped immediately.
    pub fn attach_tracked(&self, id: WidgetId, handle: CallbackHandle) {
        if let Some(node) = self.0.lock().nodes.get_mut(&id) {
            node.tracked.push(handle);
        }
    }

    /// The total number of change callbacks registered on behalf of mounted
    /// widgets.
    pub fn tracked_callbacks(&self) -> usize {
        let data = self.0.lock();
        data.nodes.values().map(|node| node.tracked.len()).sum()
    }

    /// Drops every tracked callback handle. Widgets re-register the values
    /// they depend on each time they redraw.
    pub fn clear_tracked_callbacks(&self) {
        let mut data = self.0.lock();
        for node in data.nodes.values_mut() {
            node.tracked.clear();
        }
    }

    pub fn active(&self) -> Option<WidgetId> {
        self.0.lock().active
    }

    pub fn hovered(&self) -> Option<WidgetId> {
        self.0.lock().hovered
    }

    pub fn set_hovered(&self, hovered: Option<WidgetId>) -> Option<WidgetId> {
        std::mem::replace(&mut self.0.lock().hovered, hovered)
    }

    /// Requests that `target` become the active widget once the current event
    /// callback settles. Returns true if the request changes the effective
    /// activation.
    pub fn request_activation(&self, target: Option<WidgetId>) -> bool {
        let mut data = self.0.lock();
        let effective = data.pending_activation.unwrap_or(data.active);
        if effective == target {
            false
        } else {
            data.pending_activation = Some(target);
            true
        }
    }

    pub fn take_pending_activation(&self) -> Option<Option<WidgetId>> {
        self.0.lock().pending_activation.take()
    }

    pub fn set_active(&self, active: Option<WidgetId>) {
        self.0.lock().active = active;
    }

    /// Resolves `name` by walking from `id` towards the root, returning the
    /// first styles collection that provides it.
    pub fn query_component(&self, id: WidgetId, name: &ComponentName) -> Option<Component> {
        let data = self.0.lock();
        let mut current = Some(id);
        while let Some(id) = current {
            let node = data.nodes.get(&id)?;
            if let Some(component) = node.instance.styles().get(name) {
                return Some(component.clone());
            }
            current = node.parent;
        }
        None
    }
}

/// A widget that has been mounted into a window's widget tree.
#[derive(Clone, Debug)]
pub struct MountedWidget {
    id: WidgetId,
    instance: WidgetInstance,
    tree: Tree,
}

impl MountedWidget {
    /// The unique id of this widget.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The instance this widget was mounted from.
    #[must_use]
    pub fn instance(&self) -> &WidgetInstance {
        &self.instance
    }

    /// This widget's layout from the most recent layout pass, in its parent's
    /// coordinate space.
    #[must_use]
    pub fn last_layout(&self) -> Option<Rect<Px>> {
        self.tree.layout_of(self.id)
    }

    /// The mounted children of this widget.
    #[must_use]
    pub fn children(&self) -> Vec<MountedWidget> {
        self.tree.children_of(self.id)
    }

    pub(crate) fn tree(&self) -> &Tree {
        &self.tree
    }
}

impl PartialEq for MountedWidget {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MountedWidget {}

#[cfg(test)]
mod tests {
    use figures::{Point, Size};

    use super::*;
    use crate::value::Dynamic;
    use crate::widgets::Label;

    #[test]
    fn removal_detaches_and_drops_tracked_handles() {
        let tree = Tree::default();
        let value = Dynamic::new(0);
        let root = tree.mount(WidgetInstance::new(Label::new("root")), None);
        let child = tree.mount(WidgetInstance::new(Label::new("child")), Some(root.id()));
        tree.attach_tracked(child.id(), value.on_change(|| {}));
        assert_eq!(value.listeners(), 1);
        assert_eq!(root.children().len(), 1);

        tree.remove(child.id());
        assert_eq!(value.listeners(), 0);
        assert!(root.children().is_empty());
    }

    #[test]
    fn window_layouts_accumulate_ancestor_origins() {
        let tree = Tree::default();
        let root = tree.mount(WidgetInstance::new(Label::new("root")), None);
        let child = tree.mount(WidgetInstance::new(Label::new("child")), Some(root.id()));
        tree.set_layout(
            root.id(),
            Rect::new(
                Point::new(Px::new(100), Px::new(50)),
                Size::new(Px::new(200), Px::new(100)),
            ),
        );
        tree.set_layout(
            child.id(),
            Rect::new(
                Point::new(Px::new(10), Px::new(5)),
                Size::new(Px::new(20), Px::new(10)),
            ),
        );
        assert_eq!(
            tree.layout_in_window(child.id()),
            Some(Rect::new(
                Point::new(Px::new(110), Px::new(55)),
                Size::new(Px::new(20), Px::new(10)),
            ))
        );
    }
}
