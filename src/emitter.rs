//! A small named-event emitter.
//!
//! Handlers are invoked synchronously, on the emitting thread, in the order they
//! were registered.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler<P> = Box<dyn FnMut(&P)>;

struct Listener<P> {
    id: ListenerId,
    event: String,
    once: bool,
    handler: Handler<P>,
}

pub struct EventEmitter<P> {
    listeners: Vec<Listener<P>>,
    next_id: u64,
}

impl<P> Default for EventEmitter<P> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<P> fmt::Debug for EventEmitter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("events", &self.event_names())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<P> EventEmitter<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &mut self,
        event: impl Into<String>,
        handler: impl FnMut(&P) + 'static,
    ) -> ListenerId {
        self.register(event.into(), false, Box::new(handler))
    }

    /// Registers a handler that is removed right after its first invocation.
    pub fn once(
        &mut self,
        event: impl Into<String>,
        handler: impl FnMut(&P) + 'static,
    ) -> ListenerId {
        self.register(event.into(), true, Box::new(handler))
    }

    fn register(&mut self, event: String, once: bool, handler: Handler<P>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            event,
            once,
            handler,
        });
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Calls every handler registered for `event`. Returns whether any handler ran.
    pub fn emit(&mut self, event: &str, payload: &P) -> bool {
        let mut fired = false;
        for listener in self.listeners.iter_mut().filter(|l| l.event == event) {
            (listener.handler)(payload);
            fired = true;
        }
        if fired {
            self.listeners.retain(|l| !(l.once && l.event == event));
        }
        fired
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.iter().filter(|l| l.event == event).count()
    }

    /// Event names with at least one listener, in first-registration order.
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for listener in &self.listeners {
            if !names.contains(&listener.event.as_str()) {
                names.push(&listener.event);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_handlers_fire_in_registration_order() {
        let log = recorder();
        let handle = log.clone();
        let mut emitter = EventEmitter::<u32>::new();
        let a = log.clone();
        emitter.on("update", move |p| a.borrow_mut().push(format!("a{p}")));
        let b = log.clone();
        emitter.on("update", move |p| b.borrow_mut().push(format!("b{p}")));

        assert!(emitter.emit("update", &7));
        assert_eq!(*handle.borrow(), vec!["a7", "b7"]);
    }

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let mut emitter = EventEmitter::<()>::new();
        assert!(!emitter.emit("start", &()));
    }

    #[test]
    fn test_only_matching_event_fires() {
        let log = recorder();
        let handle = log.clone();
        let mut emitter = EventEmitter::<()>::new();
        for name in ["start", "update", "end"] {
            let log = log.clone();
            emitter.on(name, move |_| log.borrow_mut().push(name.to_string()));
        }

        emitter.emit("end", &());
        assert_eq!(*handle.borrow(), vec!["end"]);
    }

    #[test]
    fn test_once_listener_is_removed_after_first_emit() {
        let log = recorder();
        let handle = log.clone();
        let mut emitter = EventEmitter::<()>::new();
        emitter.once("end", move |_| log.borrow_mut().push("end".into()));

        assert!(emitter.emit("end", &()));
        assert!(!emitter.emit("end", &()));
        assert_eq!(handle.borrow().len(), 1);
        assert_eq!(emitter.listener_count("end"), 0);
    }

    #[test]
    fn test_off_removes_listener() {
        let mut emitter = EventEmitter::<()>::new();
        let id = emitter.on("start", |_| {});
        emitter.on("start", |_| {});

        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        assert_eq!(emitter.listener_count("start"), 1);
    }

    #[test]
    fn test_event_names_are_unique() {
        let mut emitter = EventEmitter::<()>::new();
        emitter.on("update", |_| {});
        emitter.on("start", |_| {});
        emitter.on("update", |_| {});
        assert_eq!(emitter.event_names(), vec!["update", "start"]);
    }
}
