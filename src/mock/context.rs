//! The mock context: owner of every mock, the scenario ledger, the syntax
//! guard, the matcher capture and the chain being built.
//!
//! All of that state sits behind one mutex. Lock order is context state
//! first, then a mock's registry; behaviors and originals run with no lock
//! held so they may call back into mocks.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::chain::{ChainMode, ChainSegment, PendingChain, Verification};
use super::handlers::{DummyHandler, MatchingHandler, MockDispatcher};
use super::object::{Mock, MockCore, MockKind, uncapitalize};
use crate::behavior::{
    BehaviorCall, BehaviorRegistry, DefaultValueFactory, DefaultValueReturning, DummySource,
    MockBehavior, OriginalBehavior, OriginalInvoking, SelectedBehavior, StandardDefaults,
};
use crate::core::config::Config;
use crate::core::errors::{MockError, Result};
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use crate::matcher::{
    ArgumentMatcher, DefaultMatcher, InvocationPattern, MatcherCapture, MatcherSink, Matchers,
};
use crate::proxy::{
    CallSite, DirectProxyFactory, Interface, Invocation, MethodSignature, Proxy, ProxyCall,
    ProxyFactory, ProxyId,
};
use crate::scenario::{
    DefaultScenarioReport, EntryId, ObservedInvocation, Outcome, Scenario, ScenarioEntry,
    ScenarioReport,
};
use crate::syntax::{ChainEntry, SyntaxGuard};
use crate::value::{CloneService, DeepCloner, Value, ValueType};

// ──────────────────── state ────────────────────

#[derive(Default)]
struct ContextState {
    scenario: Scenario,
    guard: SyntaxGuard,
    capture: MatcherCapture,
    chain: Option<PendingChain>,
    /// Interfaces a chain may continue through, by name.
    interfaces: HashMap<String, Arc<Interface>>,
    /// Chained mocks keyed by (parent real proxy, method).
    chained: HashMap<(ProxyId, String), Arc<MockCore>>,
    mocks: Vec<Arc<MockCore>>,
}

pub(crate) struct ContextShared {
    config: Config,
    proxies: Arc<dyn ProxyFactory>,
    cloner: Arc<dyn CloneService>,
    defaults: Arc<dyn DefaultValueFactory>,
    report: Arc<dyn ScenarioReport>,
    state: Mutex<ContextState>,
    log: Option<Mutex<JsonlWriter>>,
    this: Weak<ContextShared>,
}

// ──────────────────── public handle ────────────────────

/// One test's worth of mocks.
///
/// ```rust
/// use chainmock::prelude::*;
///
/// # fn main() -> chainmock::core::errors::Result<()> {
/// let ctx = MockContext::new();
/// let iface = Interface::builder("Greeter")
///     .method(MethodSignature::new("greet").param(ValueType::Str).returns(ValueType::Str))
///     .build();
/// let greeter = ctx.mock("greeter", &iface);
///
/// greeter.get_mock().invoke("greet", args!["Bob"])?;
///
/// greeter.assert_invoked()?.invoke("greet", args!["Bob"])?;
/// ctx.assert_no_more_invocations()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MockContext {
    shared: Arc<ContextShared>,
}

impl Default for MockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("MockContext")
            .field("mocks", &state.mocks.len())
            .field("observed", &state.scenario.len())
            .field("chain_open", &state.chain.is_some())
            .finish_non_exhaustive()
    }
}

impl MockContext {
    /// Context with default configuration and collaborators.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: Config) -> Self {
        Self::builder().config(config).build()
    }

    /// Context configured from `path` (or `chainmock.toml`) plus environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Ok(Self::with_config(Config::load(path)?))
    }

    pub fn builder() -> MockContextBuilder {
        MockContextBuilder::default()
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Make `interface` available for chaining and dummies without mocking it.
    pub fn register_interface(&self, interface: &Arc<Interface>) {
        self.shared.register_interface(interface);
    }

    /// A strict mock: unmatched calls return type defaults.
    ///
    /// An empty `name` uses the interface name with a lowercase first letter.
    pub fn mock(&self, name: &str, interface: &Arc<Interface>) -> Mock {
        self.add_mock(name, interface, MockKind::Strict, None)
    }

    /// A mock that calls `original` whenever no registered behavior matches.
    pub fn partial_mock(
        &self,
        name: &str,
        interface: &Arc<Interface>,
        original: impl OriginalBehavior + 'static,
    ) -> Mock {
        self.add_mock(name, interface, MockKind::Partial, Some(Arc::new(original)))
    }

    /// A proxy that records nothing and returns type defaults.
    pub fn dummy(&self, name: &str, interface: &Arc<Interface>) -> Proxy {
        self.shared.register_interface(interface);
        self.shared.create_dummy(name, Arc::clone(interface))
    }

    /// Matcher factories bound to this context.
    pub fn matchers(&self) -> Matchers {
        Matchers::new(self.shared.clone())
    }

    /// Snapshot of the scenario so far.
    pub fn observed(&self) -> Vec<ScenarioEntry> {
        self.shared.state.lock().scenario.entries().to_vec()
    }

    /// The scenario rendered by the configured report.
    pub fn scenario_report(&self) -> String {
        let state = self.shared.state.lock();
        self.shared.report.render(state.scenario.entries())
    }

    /// Every observed call is verified or had a configured behavior.
    #[track_caller]
    pub fn assert_no_more_invocations(&self) -> Result<()> {
        self.shared
            .assert_no_more_invocations(None, Location::caller())
    }

    /// Start over: clears the scenario, the chain state, chained mocks and
    /// every registered behavior. Mocks stay usable.
    pub fn reset(&self) {
        self.shared.reset();
    }

    fn add_mock(
        &self,
        name: &str,
        interface: &Arc<Interface>,
        kind: MockKind,
        original: Option<Arc<dyn OriginalBehavior>>,
    ) -> Mock {
        let name = if name.is_empty() {
            uncapitalize(interface.name())
        } else {
            name.to_string()
        };
        let core = self
            .shared
            .new_core(name, Arc::clone(interface), kind, original);
        {
            let mut state = self.shared.state.lock();
            state
                .interfaces
                .entry(interface.name().to_string())
                .or_insert_with(|| Arc::clone(interface));
            state.mocks.push(Arc::clone(&core));
        }
        Mock {
            ctx: Arc::clone(&self.shared),
            core,
        }
    }
}

// ──────────────────── builder ────────────────────

/// Injects collaborators; anything left unset uses the built-in default.
#[derive(Default)]
pub struct MockContextBuilder {
    config: Option<Config>,
    proxies: Option<Arc<dyn ProxyFactory>>,
    cloner: Option<Arc<dyn CloneService>>,
    defaults: Option<Arc<dyn DefaultValueFactory>>,
    report: Option<Arc<dyn ScenarioReport>>,
}

impl MockContextBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn proxy_factory(mut self, factory: impl ProxyFactory + 'static) -> Self {
        self.proxies = Some(Arc::new(factory));
        self
    }

    pub fn clone_service(mut self, cloner: impl CloneService + 'static) -> Self {
        self.cloner = Some(Arc::new(cloner));
        self
    }

    pub fn default_values(mut self, defaults: impl DefaultValueFactory + 'static) -> Self {
        self.defaults = Some(Arc::new(defaults));
        self
    }

    pub fn scenario_report(mut self, report: impl ScenarioReport + 'static) -> Self {
        self.report = Some(Arc::new(report));
        self
    }

    pub fn build(self) -> MockContext {
        let config = self.config.unwrap_or_default();
        let proxies: Arc<dyn ProxyFactory> = match self.proxies {
            Some(proxies) => proxies,
            None => Arc::new(DirectProxyFactory::default()),
        };
        let cloner: Arc<dyn CloneService> = match self.cloner {
            Some(cloner) => cloner,
            None => Arc::new(DeepCloner),
        };
        let defaults: Arc<dyn DefaultValueFactory> = match self.defaults {
            Some(defaults) => defaults,
            None => Arc::new(StandardDefaults),
        };
        let report: Arc<dyn ScenarioReport> = match self.report {
            Some(report) => report,
            None => Arc::new(DefaultScenarioReport::from_config(&config.report)),
        };
        let log = config
            .logging
            .enabled
            .then(|| Mutex::new(JsonlWriter::open(JsonlConfig::from_logging(&config.logging))));

        let shared = Arc::new_cyclic(|this| ContextShared {
            config,
            proxies,
            cloner,
            defaults,
            report,
            state: Mutex::new(ContextState::default()),
            log,
            this: this.clone(),
        });
        shared.log(|| {
            let mut entry = LogEntry::new(EventType::ContextStart, Severity::Info);
            entry.details = shared
                .config
                .stable_hash()
                .ok()
                .map(|hash| format!("config {hash}"));
            entry
        });
        MockContext { shared }
    }
}

// ──────────────────── engine ────────────────────

impl ContextShared {
    pub(crate) fn defaults(&self) -> &dyn DefaultValueFactory {
        &*self.defaults
    }

    fn register_interface(&self, interface: &Arc<Interface>) {
        self.state
            .lock()
            .interfaces
            .insert(interface.name().to_string(), Arc::clone(interface));
    }

    pub(crate) fn new_core(
        &self,
        name: String,
        interface: Arc<Interface>,
        kind: MockKind,
        original: Option<Arc<dyn OriginalBehavior>>,
    ) -> Arc<MockCore> {
        Arc::new_cyclic(|core| {
            let dispatcher = Arc::new(MockDispatcher {
                ctx: self.this.clone(),
                core: core.clone(),
            });
            let matching = Arc::new(MatchingHandler {
                ctx: self.this.clone(),
                core: core.clone(),
            });
            let proxy = self
                .proxies
                .create_proxy(&name, Arc::clone(&interface), dispatcher);
            let matching_proxy = self
                .proxies
                .create_proxy(&name, Arc::clone(&interface), matching);
            MockCore {
                name,
                interface,
                kind,
                original,
                registry: Mutex::new(BehaviorRegistry::new()),
                proxy,
                matching_proxy,
            }
        })
    }

    fn create_dummy(&self, name: &str, interface: Arc<Interface>) -> Proxy {
        let handler = Arc::new(DummyHandler {
            ctx: self.this.clone(),
        });
        self.proxies.create_proxy(name, interface, handler)
    }

    // ──────────────────── chains ────────────────────

    pub(crate) fn start_chain(
        &self,
        core: &Arc<MockCore>,
        entry: &'static str,
        mode: ChainMode,
        started_at: CallSite,
    ) -> Result<Proxy> {
        let mut state = self.state.lock();
        match self.start_chain_locked(&mut state, core, entry, mode, started_at) {
            Ok(proxy) => Ok(proxy),
            Err(err) => Err(self.abort(&mut state, err)),
        }
    }

    fn start_chain_locked(
        &self,
        state: &mut ContextState,
        core: &Arc<MockCore>,
        entry: &'static str,
        mode: ChainMode,
        started_at: CallSite,
    ) -> Result<Proxy> {
        state.guard.start_chain(ChainEntry {
            token: core.matching_proxy.id(),
            mock_name: core.name.clone(),
            entry,
            started_at,
        })?;
        self.seal(state)?;
        if let ChainMode::Assert(Verification::Times(0)) = mode {
            return Err(MockError::InvalidTimes { times: 0 });
        }

        state.chain = Some(PendingChain::new(entry, started_at, mode, Arc::clone(core)));
        state.capture.open();
        self.log(|| {
            let mut log = LogEntry::new(EventType::ChainStart, Severity::Info);
            log.mock = Some(core.name.clone());
            log.details = Some(entry.to_string());
            log.location = Some(started_at.to_string());
            log
        });
        Ok(core.matching_proxy.clone())
    }

    pub(crate) fn matching_call(&self, core: &Arc<MockCore>, call: ProxyCall) -> Result<Value> {
        let mut state = self.state.lock();
        match self.matching_call_locked(&mut state, core, &call) {
            Ok(value) => Ok(value),
            Err(err) => Err(self.abort(&mut state, err)),
        }
    }

    fn matching_call_locked(
        &self,
        state: &mut ContextState,
        core: &Arc<MockCore>,
        call: &ProxyCall,
    ) -> Result<Value> {
        let token = call.proxy.id();
        let mut chain = match state.chain.take() {
            Some(chain) if chain.tip.matching_proxy.id() == token => chain,
            other => {
                state.chain = other;
                state.guard.check_call(token)?;
                self.seal(state)?;
                return Err(MockError::UnexpectedMatchingCall {
                    mock: core.name.clone(),
                    method: call.method_name.clone(),
                });
            }
        };

        let method = call.signature()?;
        state.guard.complete();

        let flavor = if chain.mode.is_define() {
            self.config.matching.behavior_default
        } else {
            self.config.matching.assertion_default
        };
        let matchers = state.capture.finish(
            method.name(),
            &call.arguments,
            |literal| -> Box<dyn ArgumentMatcher> {
                Box::new(DefaultMatcher::new(literal.clone(), flavor, &*self.cloner))
            },
        )?;
        let pattern = InvocationPattern::new(
            core.name.clone(),
            core.proxy.id(),
            Arc::clone(&method),
            matchers,
            chain.started_at,
        )?;
        let next = self.chained_mock(state, core, &method);

        if let ChainMode::Assert(verification) = chain.mode {
            self.verify(state, &pattern, verification, chain.started_at)?;
            return Ok(match next {
                Some(next) => self.extend(state, chain, next, true),
                None => trailing_result(&method),
            });
        }

        let compatible = match &chain.mode {
            ChainMode::Define { behavior, .. } => {
                behavior.check_compatible(&method, &state.interfaces)
            }
            ChainMode::Assert(_) => Ok(()),
        };
        chain.segments.push(ChainSegment {
            mock: Arc::clone(core),
            pattern,
        });
        match next {
            Some(next) => Ok(self.extend(state, chain, next, compatible.is_ok())),
            None => {
                compatible?;
                self.install(chain);
                Ok(trailing_result(&method))
            }
        }
    }

    /// The mock a chain continues through after `method`, if `method`
    /// returns a known interface. Created once per (mock, method).
    fn chained_mock(
        &self,
        state: &mut ContextState,
        core: &MockCore,
        method: &MethodSignature,
    ) -> Option<Arc<MockCore>> {
        let interface = method
            .return_type()
            .interface_name()
            .and_then(|name| state.interfaces.get(name))
            .cloned()?;
        let key = (core.proxy.id(), method.name().to_string());
        let next = state.chained.entry(key).or_insert_with(|| {
            self.new_core(
                format!("{}.{}", core.name, method.name()),
                interface,
                MockKind::Strict,
                None,
            )
        });
        Some(Arc::clone(next))
    }

    /// Hand out the next mock's matching proxy. A satisfied chain leaves the
    /// guard idle; otherwise the guard waits for a call on that proxy.
    fn extend(
        &self,
        state: &mut ContextState,
        mut chain: PendingChain,
        next: Arc<MockCore>,
        satisfied: bool,
    ) -> Value {
        let proxy = next.matching_proxy.clone();
        if !satisfied {
            state.guard.resume(ChainEntry {
                token: proxy.id(),
                mock_name: next.name.clone(),
                entry: chain.entry,
                started_at: chain.started_at,
            });
        }
        chain.tip = next;
        state.chain = Some(chain);
        state.capture.open();
        Value::Proxy(proxy)
    }

    fn verify(
        &self,
        state: &mut ContextState,
        pattern: &InvocationPattern,
        verification: Verification,
        asserted_at: CallSite,
    ) -> Result<()> {
        let report = &*self.report;
        let scenario = &mut state.scenario;
        match verification {
            Verification::Invoked => scenario.assert_invoked(pattern, asserted_at, report),
            Verification::Times(times) => {
                scenario.assert_invoked_times(pattern, times, asserted_at, report)
            }
            Verification::InSequence => {
                scenario.assert_invoked_in_sequence(pattern, asserted_at, report)
            }
            Verification::NotInvoked => scenario.assert_not_invoked(pattern, asserted_at, report),
        }?;
        self.log(|| {
            let mut log = LogEntry::new(EventType::AssertionPassed, Severity::Info);
            log.mock = Some(pattern.mock_name().to_string());
            log.call = Some(pattern.to_string());
            log.location = Some(asserted_at.to_string());
            log.ok = Some(true);
            log
        });
        Ok(())
    }

    /// Install a satisfied chain. Matchers registered since it was satisfied
    /// were never used.
    fn seal(&self, state: &mut ContextState) -> Result<()> {
        let pending = state.capture.pending();
        state.capture.close();
        let chain = state.chain.take();
        if pending > 0 {
            return Err(MockError::UnusedMatchers { count: pending });
        }
        if let Some(chain) = chain {
            self.install(chain);
        }
        Ok(())
    }

    fn install(&self, chain: PendingChain) {
        for (mock, call, behavior) in chain.install() {
            self.log(|| {
                let mut log = LogEntry::new(EventType::BehaviorDefined, Severity::Info);
                log.mock = Some(mock);
                log.call = Some(call);
                log.behavior = Some(behavior);
                log
            });
        }
    }

    /// Drop the open chain after an error and report the error once.
    fn abort(&self, state: &mut ContextState, err: MockError) -> MockError {
        state.guard.reset();
        state.capture.close();
        state.chain = None;
        self.log(|| {
            let (event, severity) = if err.is_assertion() {
                (EventType::AssertionFailed, Severity::Critical)
            } else {
                (EventType::UsageError, Severity::Warning)
            };
            LogEntry::new(event, severity).with_error(&err)
        });
        err
    }

    // ──────────────────── dispatch ────────────────────

    pub(crate) fn dispatch(&self, core: &Arc<MockCore>, call: ProxyCall) -> Result<Value> {
        let ObservedCall {
            invocation,
            behavior,
            selected,
            entry,
        } = {
            let mut state = self.state.lock();
            match self.observe(&mut state, core, call) {
                Ok(observed) => observed,
                Err(err) => return Err(self.abort(&mut state, err)),
            }
        };

        let behavior_call = BehaviorCall::new(
            &invocation,
            &*self.defaults,
            self,
            core.original.as_deref(),
        );
        let result = match &behavior {
            Some(behavior) => behavior.execute(&behavior_call),
            None => Ok(Value::Unit),
        };

        let outcome = match &result {
            Ok(value) => Outcome::Returned(self.cloner.deep_clone(value)),
            Err(err) => Outcome::Raised(err.to_string()),
        };
        self.state.lock().scenario.complete(entry, outcome);
        self.log(|| {
            let mut log = LogEntry::new(EventType::InvocationObserved, Severity::Info);
            log.mock = Some(core.name.clone());
            log.call = Some(invocation.to_string());
            log.behavior = behavior.as_ref().map(|b| b.describe());
            log.location = Some(invocation.invoked_at().to_string());
            if let Some(selected) = selected {
                log.pattern = Some(selected.pattern);
                log.score = Some(selected.score);
                log.one_time = Some(selected.one_time);
            }
            match &result {
                Ok(_) => {
                    log.ok = Some(true);
                    log
                }
                Err(err) => log.with_error(err),
            }
        });
        result
    }

    /// Resolve, select and record a call on a real proxy.
    fn observe(
        &self,
        state: &mut ContextState,
        core: &MockCore,
        call: ProxyCall,
    ) -> Result<ObservedCall> {
        let method = call.signature()?;
        state.guard.check_call(call.proxy.id())?;
        self.seal(state)?;
        if let Some(position) = call.arguments.iter().position(Value::is_placeholder) {
            return Err(MockError::PlaceholderInCall {
                method: format!("{}.{}", core.name, method.name()),
                position,
            });
        }

        let snapshot = call
            .arguments
            .iter()
            .map(|arg| self.cloner.deep_clone(arg))
            .collect();
        let invocation = Invocation::new(
            core.name.clone(),
            core.proxy.id(),
            method,
            call.arguments,
            snapshot,
            call.invoked_at,
        );

        let selected = core.registry.lock().select(&invocation)?;
        let (behavior, defined_at) = match &selected {
            Some(selected) => (Some(Arc::clone(&selected.behavior)), Some(selected.defined_at)),
            None => (default_behavior(core, invocation.method()), None),
        };
        let label = behavior.as_ref().map(|b| b.describe());
        let entry = state.scenario.record(ObservedInvocation::new(
            invocation.clone(),
            label,
            defined_at,
        ));
        Ok(ObservedCall {
            invocation,
            behavior,
            selected,
            entry,
        })
    }

    pub(crate) fn assert_no_more_invocations(
        &self,
        only: Option<ProxyId>,
        asserted_at: CallSite,
    ) -> Result<()> {
        let mut state = self.state.lock();
        match self.no_more_invocations_locked(&mut state, only, asserted_at) {
            Ok(()) => {
                self.log(|| {
                    let mut log = LogEntry::new(EventType::AssertionPassed, Severity::Info);
                    log.call = Some("no more invocations".to_string());
                    log.location = Some(asserted_at.to_string());
                    log.ok = Some(true);
                    log
                });
                Ok(())
            }
            Err(err) => Err(self.abort(&mut state, err)),
        }
    }

    fn no_more_invocations_locked(
        &self,
        state: &mut ContextState,
        only: Option<ProxyId>,
        asserted_at: CallSite,
    ) -> Result<()> {
        state.guard.ensure_idle()?;
        self.seal(state)?;
        state
            .scenario
            .assert_no_more_invocations(only, asserted_at, &*self.report)
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.scenario.reset();
        state.guard.reset();
        state.capture.close();
        state.chain = None;
        for core in state.mocks.iter().chain(state.chained.values()) {
            core.registry.lock().reset();
        }
        state.chained.clear();
        if let Some(writer) = &self.log {
            writer.lock().try_recover();
        }
        self.log(|| LogEntry::new(EventType::ContextReset, Severity::Info));
    }

    fn log(&self, build: impl FnOnce() -> LogEntry) {
        if let Some(writer) = &self.log {
            writer.lock().write_entry(&build());
        }
    }
}

/// A call recorded in the scenario whose behavior has not run yet.
struct ObservedCall {
    invocation: Invocation,
    behavior: Option<Arc<dyn MockBehavior>>,
    selected: Option<SelectedBehavior>,
    entry: EntryId,
}

/// What a strict or partial mock does when nothing matched.
fn default_behavior(core: &MockCore, method: &MethodSignature) -> Option<Arc<dyn MockBehavior>> {
    match core.kind {
        MockKind::Partial => Some(Arc::new(OriginalInvoking)),
        MockKind::Strict if method.is_void() => None,
        MockKind::Strict => Some(Arc::new(DefaultValueReturning)),
    }
}

/// Value returned by the call that ends a chain.
fn trailing_result(method: &MethodSignature) -> Value {
    if method.is_void() { Value::Unit } else { Value::Null }
}

// ──────────────────── ports ────────────────────

impl MatcherSink for ContextShared {
    fn register_matcher(
        &self,
        matcher: Box<dyn ArgumentMatcher>,
        placeholder_type: Option<&ValueType>,
    ) -> Result<Value> {
        let mut state = self.state.lock();
        match state.capture.register(matcher, placeholder_type) {
            Ok(placeholder) => Ok(placeholder),
            Err(err) => Err(self.abort(&mut state, err)),
        }
    }

    fn clone_service(&self) -> &dyn CloneService {
        &*self.cloner
    }
}

impl DummySource for ContextShared {
    fn dummy(&self, interface: &str) -> Option<Proxy> {
        let interface = self.state.lock().interfaces.get(interface).cloned()?;
        let name = format!("{}Dummy", uncapitalize(interface.name()));
        Some(self.create_dummy(&name, interface))
    }
}
