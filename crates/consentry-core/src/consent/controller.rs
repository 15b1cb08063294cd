use std::collections::HashMap;

use tracing::{debug, warn};

use super::models::{ConsentEvent, ConsentStatus};
use crate::config::AppConfig;
use crate::events::ConsentBus;
use crate::page::{ClickEvent, ElementId, Page};
use crate::store::{CookieJar, CookieScope};
use crate::Result;

/// What a bound control does when activated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentAction {
    Accept,
    Reject,
}

/// Gates banner visibility on the persisted consent record, persists the
/// visitor's decision, and broadcasts each transition.
///
/// One instance per page; constructed explicitly rather than living as
/// module-level state, so tests can build independent instances.
pub struct ConsentController<J: CookieJar> {
    jar: J,
    config: AppConfig,
    page: Page,
    banner: Option<ElementId>,
    bindings: HashMap<ElementId, ConsentAction>,
    bus: ConsentBus,
}

impl<J: CookieJar> ConsentController<J> {
    pub fn new(jar: J, config: AppConfig, page: Page) -> Self {
        Self {
            jar,
            config,
            page,
            banner: None,
            bindings: HashMap::new(),
            bus: ConsentBus::new(),
        }
    }

    /// Register a broadcast subscriber
    pub fn subscribe(&mut self, subscriber: impl Fn(&ConsentEvent) + Send + 'static) {
        self.bus.subscribe(subscriber);
    }

    /// Locate the banner and its two controls, bind them, and evaluate
    /// the initial visibility.
    ///
    /// A page without a banner is not an error; the operation logs and
    /// no-ops, and the visibility setters stay safe no-ops. Fewer than
    /// two controls also no-ops: partial wiring would leave the visitor
    /// unable to dismiss the banner. Calling this again re-binds the
    /// controls instead of accumulating duplicates.
    pub async fn initialize(&mut self) -> Result<()> {
        let Some(banner) = self.page.query(&self.config.banner.selector) else {
            warn!(
                "Cookie banner element not found: {}",
                self.config.banner.selector
            );
            return Ok(());
        };
        self.banner = Some(banner);

        let controls = self
            .page
            .query_within(banner, &self.config.banner.control_selector);
        if controls.len() < 2 {
            warn!(
                "Expected at least 2 controls in cookie banner, found {}",
                controls.len()
            );
            return Ok(());
        }

        self.bindings.clear();
        self.bindings.insert(controls[0], ConsentAction::Accept);
        self.bindings.insert(controls[1], ConsentAction::Reject);

        self.check_consent().await
    }

    /// Show the banner if no live record exists, hide it otherwise.
    /// Never mutates the record, never broadcasts.
    pub async fn check_consent(&mut self) -> Result<()> {
        if self.status().await?.is_some() {
            self.hide();
        } else {
            self.show();
        }
        Ok(())
    }

    /// Dispatch a control activation.
    ///
    /// Suppresses the event's default behavior before acting; clicks on
    /// unbound elements are ignored.
    pub async fn handle_click(&mut self, element: ElementId, event: &mut ClickEvent) -> Result<()> {
        let Some(action) = self.bindings.get(&element).copied() else {
            debug!("Click on unbound element ignored");
            return Ok(());
        };
        event.prevent_default();

        match action {
            ConsentAction::Accept => self.accept().await,
            ConsentAction::Reject => self.reject().await.map(|_| ()),
        }
    }

    /// Persist acceptance, hide the banner, broadcast.
    /// Leaves every other stored entry untouched.
    pub async fn accept(&mut self) -> Result<()> {
        self.jar
            .set(
                &self.config.consent.cookie_name,
                "accepted",
                self.config.consent.ttl_days,
            )
            .await?;
        self.hide();
        self.broadcast(ConsentStatus::Accepted);
        Ok(())
    }

    /// Persist rejection, purge all other stored entries, hide the
    /// banner, broadcast. Returns how many other names were fully purged.
    pub async fn reject(&mut self) -> Result<usize> {
        self.jar
            .set(
                &self.config.consent.cookie_name,
                "rejected",
                self.config.consent.ttl_days,
            )
            .await?;
        let purged = self.purge_other_entries().await;
        self.hide();
        self.broadcast(ConsentStatus::Rejected);
        Ok(purged)
    }

    /// Best-effort deletion of every stored name except the consent
    /// record, attempted under each enumerated scope variant.
    ///
    /// Individual failures are logged and never abort the remaining
    /// attempts. Returns how many names were purged with every deletion
    /// attempt succeeding.
    pub async fn purge_other_entries(&self) -> usize {
        let names = match self.jar.names().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not enumerate stored entries for purge: {}", e);
                return 0;
            }
        };

        let variants = CookieScope::purge_variants(self.config.consent.hostname.as_deref());
        let mut purged = 0;

        for name in names {
            if name == self.config.consent.cookie_name {
                continue;
            }
            let mut clean = true;
            for scope in &variants {
                if let Err(e) = self.jar.delete_scoped(&name, scope).await {
                    warn!("Failed to delete entry '{}' under {:?}: {}", name, scope, e);
                    clean = false;
                }
            }
            if clean {
                purged += 1;
            }
        }

        purged
    }

    /// Idempotent; safe no-op when no banner was located
    pub fn show(&mut self) {
        if let Some(banner) = self.banner {
            self.page.add_class(banner, &self.config.banner.active_class);
        }
    }

    /// Idempotent; safe no-op when no banner was located
    pub fn hide(&mut self) {
        if let Some(banner) = self.banner {
            self.page
                .remove_class(banner, &self.config.banner.active_class);
        }
    }

    /// Delete the consent record only and re-show the banner
    pub async fn reset(&mut self) -> Result<()> {
        self.jar.delete(&self.config.consent.cookie_name).await?;
        self.show();
        Ok(())
    }

    /// Raw stored value; `None` when unset or expired
    pub async fn status(&self) -> Result<Option<String>> {
        self.jar.get(&self.config.consent.cookie_name).await
    }

    /// Typed reading of the stored value
    pub async fn consent_status(&self) -> Result<ConsentStatus> {
        let value = self.status().await?;
        Ok(ConsentStatus::from_value(value.as_deref()))
    }

    pub fn banner_visible(&self) -> bool {
        self.banner
            .map(|banner| self.page.has_class(banner, &self.config.banner.active_class))
            .unwrap_or(false)
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }

    fn broadcast(&self, status: ConsentStatus) {
        self.bus.publish(&ConsentEvent::now(status));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::store::MemoryJar;
    use crate::Error;

    /// Jar that fails writes and/or deletions of one name, delegating
    /// everything else to an inner in-memory jar
    struct FlakyJar {
        inner: MemoryJar,
        fail_writes: bool,
        fail_delete_name: Option<&'static str>,
    }

    impl FlakyJar {
        fn failing_writes(inner: MemoryJar) -> Self {
            Self {
                inner,
                fail_writes: true,
                fail_delete_name: None,
            }
        }

        fn failing_delete_of(inner: MemoryJar, name: &'static str) -> Self {
            Self {
                inner,
                fail_writes: false,
                fail_delete_name: Some(name),
            }
        }
    }

    fn storage_error() -> Error {
        Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
    }

    #[async_trait]
    impl CookieJar for FlakyJar {
        async fn set(&self, name: &str, value: &str, ttl_days: u32) -> crate::Result<()> {
            if self.fail_writes {
                return Err(storage_error());
            }
            self.inner.set(name, value, ttl_days).await
        }

        async fn get(&self, name: &str) -> crate::Result<Option<String>> {
            self.inner.get(name).await
        }

        async fn delete_scoped(&self, name: &str, scope: &CookieScope) -> crate::Result<()> {
            if self.fail_delete_name == Some(name) {
                return Err(storage_error());
            }
            self.inner.delete_scoped(name, scope).await
        }

        async fn names(&self) -> crate::Result<Vec<String>> {
            self.inner.names().await
        }
    }

    /// Banner page matching the default selectors, with the accept and
    /// reject control handles
    fn banner_page() -> (Page, ElementId, ElementId) {
        let mut page = Page::new();
        let body = page.add_element("body", &[]);
        let banner = page.add_child(body, "div", &["c-cookies"]);
        let accept = page.add_child(banner, "a", &["c-btn"]);
        let reject = page.add_child(banner, "a", &["c-btn"]);
        (page, accept, reject)
    }

    fn controller_with(jar: MemoryJar) -> (ConsentController<MemoryJar>, ElementId, ElementId) {
        let (page, accept, reject) = banner_page();
        let mut config = AppConfig::default();
        config.consent.hostname = Some("example.com".to_string());
        (ConsentController::new(jar, config, page), accept, reject)
    }

    fn observe<J: CookieJar>(
        controller: &mut ConsentController<J>,
    ) -> Arc<Mutex<Vec<ConsentEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        controller.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[tokio::test]
    async fn test_fresh_state_shows_banner() {
        let (mut controller, _, _) = controller_with(MemoryJar::new());
        controller.initialize().await.unwrap();
        assert!(controller.banner_visible());
        assert_eq!(controller.status().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_existing_record_keeps_banner_hidden_without_broadcast() {
        let jar = MemoryJar::new();
        jar.set("cookieConsent", "rejected", 7).await.unwrap();

        let (mut controller, _, _) = controller_with(jar);
        let events = observe(&mut controller);

        controller.initialize().await.unwrap();
        assert!(!controller.banner_visible());
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accept_click_persists_hides_and_broadcasts_once() {
        let (mut controller, accept, _) = controller_with(MemoryJar::new());
        let events = observe(&mut controller);
        controller.initialize().await.unwrap();
        assert!(controller.banner_visible());

        let mut click = ClickEvent::new();
        controller.handle_click(accept, &mut click).await.unwrap();

        assert!(click.default_prevented());
        assert_eq!(
            controller.status().await.unwrap().as_deref(),
            Some("accepted")
        );
        assert!(!controller.banner_visible());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, ConsentStatus::Accepted);
    }

    #[tokio::test]
    async fn test_accept_leaves_other_entries_alone() {
        let jar = MemoryJar::new();
        jar.set("trackerA", "x", 7).await.unwrap();

        let (mut controller, accept, _) = controller_with(jar);
        controller.initialize().await.unwrap();

        let mut click = ClickEvent::new();
        controller.handle_click(accept, &mut click).await.unwrap();

        assert_eq!(
            controller.jar().get("trackerA").await.unwrap().as_deref(),
            Some("x")
        );
    }

    #[tokio::test]
    async fn test_reject_click_purges_everything_but_the_consent_record() {
        let jar = MemoryJar::new();
        jar.set("trackerA", "x", 7).await.unwrap();
        jar.set("trackerB", "y", 7).await.unwrap();
        // An entry another script scoped to the wildcard domain variant
        jar.insert_scoped("trackerC", "z", CookieScope::wildcard("example.com"), 7);

        let (mut controller, _, reject) = controller_with(jar);
        let events = observe(&mut controller);
        controller.initialize().await.unwrap();

        let mut click = ClickEvent::new();
        controller.handle_click(reject, &mut click).await.unwrap();

        assert_eq!(
            controller.status().await.unwrap().as_deref(),
            Some("rejected")
        );
        for name in ["trackerA", "trackerB", "trackerC"] {
            assert_eq!(controller.jar().get(name).await.unwrap(), None, "{name}");
        }
        assert!(!controller.banner_visible());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, ConsentStatus::Rejected);
    }

    #[tokio::test]
    async fn test_reclick_overwrites_prior_decision() {
        let (mut controller, accept, reject) = controller_with(MemoryJar::new());
        let events = observe(&mut controller);
        controller.initialize().await.unwrap();

        let mut click = ClickEvent::new();
        controller.handle_click(accept, &mut click).await.unwrap();
        let mut click = ClickEvent::new();
        controller.handle_click(reject, &mut click).await.unwrap();

        assert_eq!(
            controller.consent_status().await.unwrap(),
            ConsentStatus::Rejected
        );
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_clears_record_and_reshows_banner() {
        let (mut controller, accept, _) = controller_with(MemoryJar::new());
        controller.initialize().await.unwrap();

        let mut click = ClickEvent::new();
        controller.handle_click(accept, &mut click).await.unwrap();
        assert!(!controller.banner_visible());

        controller.reset().await.unwrap();
        assert_eq!(controller.status().await.unwrap(), None);
        assert!(controller.banner_visible());
    }

    #[tokio::test]
    async fn test_hide_is_idempotent() {
        let (mut controller, _, _) = controller_with(MemoryJar::new());
        controller.initialize().await.unwrap();
        assert!(controller.banner_visible());

        controller.hide();
        controller.hide();
        assert!(!controller.banner_visible());
    }

    #[tokio::test]
    async fn test_missing_banner_degrades_to_noops() {
        let mut page = Page::new();
        page.add_element("body", &[]);

        let mut controller =
            ConsentController::new(MemoryJar::new(), AppConfig::default(), page);
        controller.initialize().await.unwrap();

        controller.show();
        controller.hide();
        assert!(!controller.banner_visible());
    }

    #[tokio::test]
    async fn test_single_control_leaves_banner_unwired() {
        let mut page = Page::new();
        let body = page.add_element("body", &[]);
        let banner = page.add_child(body, "div", &["c-cookies"]);
        let only = page.add_child(banner, "a", &["c-btn"]);

        let mut controller =
            ConsentController::new(MemoryJar::new(), AppConfig::default(), page);
        let events = observe(&mut controller);
        controller.initialize().await.unwrap();

        // Banner was located, so manual visibility control still works
        controller.show();
        assert!(controller.banner_visible());

        // But the lone control is not bound
        let mut click = ClickEvent::new();
        controller.handle_click(only, &mut click).await.unwrap();
        assert!(!click.default_prevented());
        assert_eq!(controller.status().await.unwrap(), None);
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reject_survives_one_failing_deletion() {
        let inner = MemoryJar::new();
        inner.set("trackerA", "x", 7).await.unwrap();
        inner.set("trackerB", "y", 7).await.unwrap();
        let jar = FlakyJar::failing_delete_of(inner, "trackerA");

        let (page, _, _) = banner_page();
        let mut controller = ConsentController::new(jar, AppConfig::default(), page);
        let events = observe(&mut controller);
        controller.initialize().await.unwrap();

        let purged = controller.reject().await.unwrap();

        // The failing name neither aborts the purge nor counts as purged
        assert_eq!(purged, 1);
        assert_eq!(controller.jar().get("trackerB").await.unwrap(), None);
        assert_eq!(
            controller.jar().get("trackerA").await.unwrap().as_deref(),
            Some("x")
        );

        assert_eq!(
            controller.status().await.unwrap().as_deref(),
            Some("rejected")
        );
        assert!(!controller.banner_visible());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, ConsentStatus::Rejected);
    }

    #[tokio::test]
    async fn test_failed_write_fails_accept_without_hiding_or_broadcasting() {
        let jar = FlakyJar::failing_writes(MemoryJar::new());
        let (page, _, _) = banner_page();
        let mut controller = ConsentController::new(jar, AppConfig::default(), page);
        let events = observe(&mut controller);
        controller.initialize().await.unwrap();
        assert!(controller.banner_visible());

        assert!(controller.accept().await.is_err());

        // Nothing committed, so nothing changes and nothing fires
        assert!(controller.banner_visible());
        assert_eq!(controller.status().await.unwrap(), None);
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reinitialize_rebinds_without_duplicates() {
        let (mut controller, accept, _) = controller_with(MemoryJar::new());
        let events = observe(&mut controller);

        controller.initialize().await.unwrap();
        controller.initialize().await.unwrap();

        let mut click = ClickEvent::new();
        controller.handle_click(accept, &mut click).await.unwrap();
        assert_eq!(events.lock().unwrap().len(), 1);
    }
}
