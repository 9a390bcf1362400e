//! Tests for interceptor composition
//!
//! These tests verify hook ordering, response threading and the
//! short-circuit of transport error translation.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::ClientError;
    use crate::interceptors::{Interceptor, InterceptorChain};
    use crate::models::{Request, Response, Verb};
    use crate::tests::support::{entries, journal, GetOrder, Recorder};

    fn chain_of(recorders: Vec<Recorder>) -> InterceptorChain {
        let mut chain = InterceptorChain::new();
        for recorder in recorders {
            chain.push(Arc::new(recorder));
        }
        chain
    }

    #[test]
    fn test_requests_forward_responses_reverse() {
        let journal = journal();
        let chain = chain_of(vec![
            Recorder::new("a", &journal),
            Recorder::new("b", &journal),
            Recorder::new("c", &journal),
        ]);
        let mut request = Request::new(GetOrder { order_number: 1 });

        let response = tokio_test::block_on(async {
            chain.on_request(&mut request, Verb::Execute).await;
            chain.on_response(&request, Response::new(), Verb::Execute).await
        });

        assert_eq!(
            entries(&journal),
            vec!["a.request", "b.request", "c.request", "c.response", "b.response", "a.response"]
        );

        // Each interceptor saw the response returned by the previous one
        let seen: Vec<&str> = response.messages.iter().map(|m| m.source_id.as_str()).collect();
        assert_eq!(seen, vec!["Seen.c", "Seen.b", "Seen.a"]);
    }

    #[tokio::test]
    async fn test_http_error_stops_at_first_translation() {
        let journal = journal();
        let chain = chain_of(vec![
            Recorder::new("a", &journal),
            Recorder::new("b", &journal).translating(),
            Recorder::new("c", &journal),
        ]);
        let request = Request::with_id("req-9", GetOrder { order_number: 9 });
        let error = ClientError::network("network down");

        let response = chain.on_http_error(&request, &error, Verb::Execute).await.unwrap();

        assert_eq!(entries(&journal), vec!["c.http_error", "b.http_error"]);
        assert_eq!(response.id.as_deref(), Some("req-9"));
        assert_eq!(response.messages[0].source_id, "Offline.b");
    }

    #[tokio::test]
    async fn test_http_error_without_translation() {
        let journal = journal();
        let chain = chain_of(vec![Recorder::new("a", &journal), Recorder::new("b", &journal)]);
        let request = Request::new(GetOrder { order_number: 2 });

        let translated = chain
            .on_http_error(&request, &ClientError::timeout("slow"), Verb::Evaluate)
            .await;

        assert!(translated.is_none());
        assert_eq!(entries(&journal), vec!["b.http_error", "a.http_error"]);
    }

    #[tokio::test]
    async fn test_empty_chain_passes_everything_through() {
        let chain = InterceptorChain::new();
        assert!(chain.is_empty());

        let mut request = Request::new(GetOrder { order_number: 3 });
        chain.on_request(&mut request, Verb::Execute).await;

        let mut response = Response::new();
        response.executed = true;
        let passed = chain.on_response(&request, response.clone(), Verb::Execute).await;
        assert_eq!(passed, response);

        let error = ClientError::network("offline");
        assert!(chain.on_http_error(&request, &error, Verb::Execute).await.is_none());
    }

    #[tokio::test]
    async fn test_default_hooks() {
        struct Silent;
        impl Interceptor for Silent {}

        let mut request = Request::new(GetOrder { order_number: 4 });
        Silent.on_request(&mut request, Verb::Execute).await;

        let response = Silent.on_response(&request, Response::new(), Verb::Execute).await;
        assert_eq!(response, Response::new());

        let error = ClientError::network("offline");
        assert!(Silent.on_http_error(&request, &error, Verb::Execute).await.is_none());
    }
}
