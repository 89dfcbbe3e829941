use crate::error::AppError;
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use governor::{clock::DefaultClock, state::keyed::DashMapStateStore, Quota, RateLimiter};
use std::future::{ready, Ready};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

type IpRateLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>;

/// Per-client-IP request quota for a scope or resource. Clones share one limiter.
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<IpRateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(requests_per_minute: NonZeroU32) -> Self {
        Self::with_quota(Quota::per_minute(requests_per_minute))
    }

    fn with_quota(quota: Quota) -> Self {
        RateLimitMiddleware {
            limiter: Arc::new(RateLimiter::dashmap(quota)),
        }
    }

    /// Drop clients whose quota has fully replenished. Returns how many are still tracked.
    pub fn prune(&self) -> usize {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        self.limiter.len()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: S,
    limiter: Arc<IpRateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Test requests carry no peer address; they share the loopback bucket.
        let ip = req
            .peer_addr()
            .map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        if self.limiter.check_key(&ip).is_err() {
            warn!(ip = %ip, path = %req.path(), "Rate limit exceeded");
            let (req, _pl) = req.into_parts();
            let res = AppError::TooManyRequests.error_response();
            return Box::pin(
                async move { Ok(ServiceResponse::new(req, res).map_into_boxed_body()) },
            );
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_boxed_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_prune_forgets_idle_clients() {
        let limiter = RateLimitMiddleware::with_quota(
            Quota::with_period(Duration::from_millis(5)).unwrap(),
        );
        let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

        assert!(limiter.limiter.check_key(&client).is_ok());
        assert!(limiter.limiter.check_key(&client).is_err());
        assert_eq!(limiter.limiter.len(), 1);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(limiter.prune(), 0);
        assert!(limiter.limiter.check_key(&client).is_ok());
    }

    #[test]
    fn test_prune_keeps_active_clients() {
        let limiter = RateLimitMiddleware::new(NonZeroU32::MIN);
        let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert!(limiter.limiter.check_key(&client).is_ok());
        assert_eq!(limiter.prune(), 1);
        assert!(limiter.limiter.check_key(&client).is_err());
    }
}
