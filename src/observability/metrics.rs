use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounterVec,
    pub dispatch_ops_total: IntCounterVec,
    pub complete_latency_seconds: HistogramVec,
    pub pending_orders: IntGauge,
    pub role_resolutions_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total = IntCounterVec::new(
            Opts::new("orders_created_total", "Orders created by type"),
            &["type"],
        )
        .expect("valid orders_created_total metric");

        let dispatch_ops_total = IntCounterVec::new(
            Opts::new(
                "dispatch_ops_total",
                "Dispatch operations by operation and outcome",
            ),
            &["op", "outcome"],
        )
        .expect("valid dispatch_ops_total metric");

        let complete_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "complete_latency_seconds",
                "Latency of order completion writes in seconds",
            ),
            &["outcome"],
        )
        .expect("valid complete_latency_seconds metric");

        let pending_orders = IntGauge::new("pending_orders", "Orders currently awaiting a driver")
            .expect("valid pending_orders metric");

        let role_resolutions_total = IntCounterVec::new(
            Opts::new("role_resolutions_total", "Role resolutions by result"),
            &["result"],
        )
        .expect("valid role_resolutions_total metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(dispatch_ops_total.clone()))
            .expect("register dispatch_ops_total");
        registry
            .register(Box::new(complete_latency_seconds.clone()))
            .expect("register complete_latency_seconds");
        registry
            .register(Box::new(pending_orders.clone()))
            .expect("register pending_orders");
        registry
            .register(Box::new(role_resolutions_total.clone()))
            .expect("register role_resolutions_total");

        Self {
            registry,
            orders_created_total,
            dispatch_ops_total,
            complete_latency_seconds,
            pending_orders,
            role_resolutions_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
