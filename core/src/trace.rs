// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Tracing hooks for the transport pipeline.
//!
//! The pipeline opens one span per call through an injected [`Tracer`]. The
//! parent span is passed explicitly as a [`SpanContext`]; without one the
//! tracer starts a root span.

use std::fmt::Debug;
use std::time::Instant;

use log::{debug, warn};

use crate::Error;

/// Identifies a span so that child spans can be attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanContext {
    /// Trace the span belongs to.
    pub trace_id: u64,
    /// The span itself.
    pub span_id: u64,
}

/// Tracer starts spans.
pub trait Tracer: Debug + Send + Sync + 'static {
    /// Start a span for `operation`, as a child of `parent` if given.
    fn start_span(&self, operation: &str, parent: Option<&SpanContext>) -> Box<dyn Span>;
}

/// Span is one traced operation.
pub trait Span: Send {
    /// Context to pass as parent of child spans, `None` if the tracer doesn't track any.
    fn context(&self) -> Option<SpanContext>;

    /// Set a tag such as `http.url` or `http.status_code`.
    fn set_tag(&mut self, key: &str, value: &str);

    /// Record a key/value log field.
    fn log_field(&mut self, key: &str, value: &str);

    /// Mark the span as failed.
    fn set_error(&mut self, err: &Error);

    /// Finish the span. Called exactly once.
    fn finish(&mut self);
}

/// ActiveSpan finishes the wrapped span when dropped.
///
/// This makes closing the span unconditional: normal return, `?` and a
/// dropped future all go through `Drop`.
pub struct ActiveSpan {
    span: Option<Box<dyn Span>>,
}

impl ActiveSpan {
    /// Start a span on `tracer`.
    pub fn start(tracer: &dyn Tracer, operation: &str, parent: Option<&SpanContext>) -> Self {
        Self {
            span: Some(tracer.start_span(operation, parent)),
        }
    }

    /// See [`Span::context`].
    pub fn context(&self) -> Option<SpanContext> {
        self.span.as_ref().and_then(|s| s.context())
    }

    /// See [`Span::set_tag`].
    pub fn set_tag(&mut self, key: &str, value: &str) {
        if let Some(span) = self.span.as_mut() {
            span.set_tag(key, value);
        }
    }

    /// See [`Span::log_field`].
    pub fn log_field(&mut self, key: &str, value: &str) {
        if let Some(span) = self.span.as_mut() {
            span.log_field(key, value);
        }
    }

    /// See [`Span::set_error`].
    pub fn set_error(&mut self, err: &Error) {
        if let Some(span) = self.span.as_mut() {
            span.set_error(err);
        }
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        if let Some(mut span) = self.span.take() {
            span.finish();
        }
    }
}

/// NoopTracer records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, _: &str, _: Option<&SpanContext>) -> Box<dyn Span> {
        Box::new(NoopSpan)
    }
}

struct NoopSpan;

impl Span for NoopSpan {
    fn context(&self) -> Option<SpanContext> {
        None
    }
    fn set_tag(&mut self, _: &str, _: &str) {}
    fn log_field(&mut self, _: &str, _: &str) {}
    fn set_error(&mut self, _: &Error) {}
    fn finish(&mut self) {}
}

/// LogTracer writes spans to the `log` facade.
///
/// Tags and fields are emitted at `debug`, failures at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn start_span(&self, operation: &str, parent: Option<&SpanContext>) -> Box<dyn Span> {
        let ctx = SpanContext {
            trace_id: parent.map(|p| p.trace_id).unwrap_or_else(rand::random),
            span_id: rand::random(),
        };
        debug!(
            "span {operation} started: trace={:016x} span={:016x} parent={:?}",
            ctx.trace_id,
            ctx.span_id,
            parent.map(|p| format!("{:016x}", p.span_id))
        );

        Box::new(LogSpan {
            operation: operation.to_string(),
            ctx,
            started: Instant::now(),
            failed: false,
        })
    }
}

struct LogSpan {
    operation: String,
    ctx: SpanContext,
    started: Instant,
    failed: bool,
}

impl Span for LogSpan {
    fn context(&self) -> Option<SpanContext> {
        Some(self.ctx)
    }

    fn set_tag(&mut self, key: &str, value: &str) {
        debug!("span {} tag {key}={value}", self.operation);
    }

    fn log_field(&mut self, key: &str, value: &str) {
        debug!("span {} field {key}={value}", self.operation);
    }

    fn set_error(&mut self, err: &Error) {
        self.failed = true;
        warn!("span {} failed: {err}", self.operation);
    }

    fn finish(&mut self) {
        debug!(
            "span {} finished in {:?}, error={}",
            self.operation,
            self.started.elapsed(),
            self.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone)]
    struct CountingTracer {
        finished: Arc<Mutex<Vec<String>>>,
    }

    struct CountingSpan {
        operation: String,
        finished: Arc<Mutex<Vec<String>>>,
    }

    impl Tracer for CountingTracer {
        fn start_span(&self, operation: &str, _: Option<&SpanContext>) -> Box<dyn Span> {
            Box::new(CountingSpan {
                operation: operation.to_string(),
                finished: self.finished.clone(),
            })
        }
    }

    impl Span for CountingSpan {
        fn context(&self) -> Option<SpanContext> {
            None
        }
        fn set_tag(&mut self, _: &str, _: &str) {}
        fn log_field(&mut self, _: &str, _: &str) {}
        fn set_error(&mut self, _: &Error) {}
        fn finish(&mut self) {
            self.finished.lock().unwrap().push(self.operation.clone());
        }
    }

    #[test]
    fn test_active_span_finishes_once_on_drop() {
        let tracer = CountingTracer::default();
        {
            let mut span = ActiveSpan::start(&tracer, "CreateOrder", None);
            span.set_tag("http.method", "post");
        }
        assert_eq!(*tracer.finished.lock().unwrap(), vec!["CreateOrder"]);
    }

    #[test]
    fn test_log_tracer_keeps_parent_trace() {
        let parent = LogTracer.start_span("parent", None);
        let parent_ctx = parent.context().unwrap();

        let child = LogTracer.start_span("child", Some(&parent_ctx));
        let child_ctx = child.context().unwrap();
        assert_eq!(child_ctx.trace_id, parent_ctx.trace_id);
        assert_ne!(child_ctx.span_id, parent_ctx.span_id);
    }

    #[test]
    fn test_noop_tracer() {
        let mut span = ActiveSpan::start(&NoopTracer, "noop", None);
        span.set_error(&Error::unexpected("boom"));
        assert_eq!(span.context(), None);
    }
}
