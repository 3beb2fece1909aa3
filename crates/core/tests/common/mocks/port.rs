use mockall::mock;
use tpsim_core::prefetch::{PrefetchPort, PrefetchRequest};

mock! {
    pub Port {}
    impl PrefetchPort for Port {
        fn ready(&self) -> bool;
        fn issue(&mut self, req: PrefetchRequest);
    }
}

/// A port that is never ready and must never receive a request.
pub fn stalled_port() -> MockPort {
    let mut port = MockPort::new();
    let _ = port.expect_ready().return_const(false);
    let _ = port.expect_issue().times(0);
    port
}
