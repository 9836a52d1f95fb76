//! One-shot messages carried across a redirect.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Take the queued message, if any. A message is shown once.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_flash(&session, Flash::success("Taladro ha sido agregado al carrito"))
            .await
            .unwrap();

        let flash = take_flash(&session).await.unwrap();
        assert_eq!(flash.message, "Taladro ha sido agregado al carrito");
        assert!(take_flash(&session).await.is_none());
    }
}
