//! Runtime narrowing of a branch subject to a concrete type.
//!
//! A subject narrows to `U` when it is a `U` itself, or a type-erased box
//! (`Box<dyn Any>`, with or without `Send`/`Sync`) currently holding a `U`.

use std::any::Any;

/// Borrow the subject as a `U`, if it is one.
pub fn instance_ref<S: 'static, U: 'static>(subject: &S) -> Option<&U> {
    let any = subject as &dyn Any;
    if let Some(direct) = any.downcast_ref::<U>() {
        return Some(direct);
    }
    if let Some(boxed) = any.downcast_ref::<Box<dyn Any>>() {
        return (**boxed).downcast_ref::<U>();
    }
    if let Some(boxed) = any.downcast_ref::<Box<dyn Any + Send>>() {
        return (**boxed).downcast_ref::<U>();
    }
    if let Some(boxed) = any.downcast_ref::<Box<dyn Any + Send + Sync>>() {
        return (**boxed).downcast_ref::<U>();
    }
    None
}

/// Try to turn the subject into a `U`, handing it back unchanged otherwise.
pub fn try_cast<S: 'static, U: 'static>(subject: S) -> Result<U, S> {
    let mut slot = Some(subject);
    let narrowed = narrow_in_place::<U>(&mut slot);
    match (narrowed, slot) {
        (Some(value), _) => Ok(value),
        (None, Some(subject)) => Err(subject),
        // A successful narrowing is the only path that empties the slot.
        (None, None) => unreachable!("subject consumed without narrowing"),
    }
}

fn narrow_in_place<U: 'static>(slot: &mut dyn Any) -> Option<U> {
    if let Some(direct) = slot.downcast_mut::<Option<U>>() {
        return direct.take();
    }
    if let Some(boxed) = slot.downcast_mut::<Option<Box<dyn Any>>>() {
        return unbox(boxed, |b| b.downcast::<U>());
    }
    if let Some(boxed) = slot.downcast_mut::<Option<Box<dyn Any + Send>>>() {
        return unbox(boxed, |b| b.downcast::<U>());
    }
    if let Some(boxed) = slot.downcast_mut::<Option<Box<dyn Any + Send + Sync>>>() {
        return unbox(boxed, |b| b.downcast::<U>());
    }
    None
}

fn unbox<B, U>(slot: &mut Option<B>, downcast: impl FnOnce(B) -> Result<Box<U>, B>) -> Option<U> {
    let boxed = slot.take()?;
    match downcast(boxed) {
        Ok(value) => Some(*value),
        Err(boxed) => {
            *slot = Some(boxed);
            None
        }
    }
}
