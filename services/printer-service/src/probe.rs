use std::{future::Future, pin::Pin};

use tokio::net::lookup_host;

pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Best-effort reachability probe. Only success or failure is consulted;
/// resolved addresses are discarded.
pub trait HostResolver {
    fn name(&self) -> &'static str;
    fn resolve<'a>(&'a self, host: &'a str) -> ResolveFuture<'a>;
}

pub struct DnsResolver;

impl HostResolver for DnsResolver {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn resolve<'a>(&'a self, host: &'a str) -> ResolveFuture<'a> {
        Box::pin(async move {
            let mut addrs = lookup_host((host, 0))
                .await
                .map_err(|err| format!("lookup {host}: {err}"))?;
            match addrs.next() {
                Some(_) => Ok(()),
                None => Err(format!("lookup {host}: no addresses")),
            }
        })
    }
}

#[cfg(test)]
pub struct StubResolver {
    pub fail: bool,
}

#[cfg(test)]
impl HostResolver for StubResolver {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn resolve<'a>(&'a self, host: &'a str) -> ResolveFuture<'a> {
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(format!("lookup {host}: stub failure"))
            } else {
                Ok(())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ip_literals_resolve_without_network() {
        assert!(DnsResolver.resolve("127.0.0.1").await.is_ok());
    }

    #[tokio::test]
    async fn stub_failure_names_host() {
        let err = StubResolver { fail: true }
            .resolve("10.0.0.1")
            .await
            .unwrap_err();
        assert!(err.contains("10.0.0.1"));
    }
}
