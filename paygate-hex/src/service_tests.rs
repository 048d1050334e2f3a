//! PaymentService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use paygate_providers::CustomGateway;
    use paygate_repo::InMemoryTransactionRepository;
    use paygate_types::{
        BillingType, CreateCustomerParams, CreatePaymentParams, GatewayMode, NewTransactionLog,
        PaymentError, PaymentProvider, PaymentStatus, ProviderCustomer, ProviderPayment,
        RefundParams, RepoError, TransactionLog, TransactionRepository, WebhookPayload,
    };

    use crate::{PaymentService, SimulationAction};

    /// Repository whose writes always fail.
    pub struct FailingRepo;

    #[async_trait]
    impl TransactionRepository for FailingRepo {
        async fn log(&self, _entry: NewTransactionLog) -> Result<(), RepoError> {
            Err(RepoError::Unavailable("audit store offline".into()))
        }

        async fn get_by_provider(
            &self,
            _provider: &str,
            _limit: Option<usize>,
        ) -> Result<Vec<TransactionLog>, RepoError> {
            Err(RepoError::Unavailable("audit store offline".into()))
        }

        async fn get_by_company_id(
            &self,
            _company_id: &str,
            _limit: Option<usize>,
        ) -> Result<Vec<TransactionLog>, RepoError> {
            Err(RepoError::Unavailable("audit store offline".into()))
        }

        async fn get_by_company_and_provider(
            &self,
            _company_id: &str,
            _provider: &str,
            _limit: Option<usize>,
        ) -> Result<Vec<TransactionLog>, RepoError> {
            Err(RepoError::Unavailable("audit store offline".into()))
        }
    }

    /// Provider that fails every call, recording how often it was hit.
    pub struct DownProvider {
        calls: Mutex<usize>,
    }

    impl DownProvider {
        fn new() -> Self {
            Self {
                calls: Mutex::new(0),
            }
        }

        fn fail<T>(&self) -> Result<T, PaymentError> {
            *self.calls.lock().unwrap() += 1;
            Err(PaymentError::unavailable("down", "connection refused"))
        }
    }

    #[async_trait]
    impl PaymentProvider for DownProvider {
        fn name(&self) -> &str {
            "down"
        }

        async fn create_customer(
            &self,
            _params: CreateCustomerParams,
        ) -> Result<ProviderCustomer, PaymentError> {
            self.fail()
        }

        async fn get_customer_by_cpf_cnpj(
            &self,
            _cpf_cnpj: &str,
        ) -> Result<Option<ProviderCustomer>, PaymentError> {
            self.fail()
        }

        async fn create_payment(
            &self,
            _params: CreatePaymentParams,
        ) -> Result<ProviderPayment, PaymentError> {
            self.fail()
        }

        async fn get_payment(&self, _payment_id: &str) -> Result<ProviderPayment, PaymentError> {
            self.fail()
        }

        async fn get_payment_by_external_reference(
            &self,
            _external_reference: &str,
        ) -> Result<Option<ProviderPayment>, PaymentError> {
            self.fail()
        }

        async fn refund_payment(
            &self,
            _params: RefundParams,
        ) -> Result<ProviderPayment, PaymentError> {
            self.fail()
        }

        async fn cancel_payment(&self, _payment_id: &str) -> Result<(), PaymentError> {
            self.fail()
        }

        fn parse_webhook(&self, _body: &[u8]) -> Result<WebhookPayload, PaymentError> {
            Err(PaymentError::invalid_webhook("down", "not supported"))
        }
    }

    fn custom_gateway() -> Arc<dyn PaymentProvider> {
        Arc::new(CustomGateway::new(GatewayMode::Test).unwrap())
    }

    fn audited_service() -> (PaymentService, Arc<InMemoryTransactionRepository>) {
        let repo = Arc::new(InMemoryTransactionRepository::new());
        let service = PaymentService::new(custom_gateway(), Some(repo.clone()));
        (service, repo)
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
    }

    #[tokio::test]
    async fn test_active_provider_name() {
        let service = PaymentService::new(custom_gateway(), None);

        assert_eq!(service.active_provider(), "custom");
        assert!(service.supports_simulation());
    }

    #[tokio::test]
    async fn test_success_is_logged_with_masked_request() {
        let (service, repo) = audited_service();

        let customer = service
            .create_customer(
                CreateCustomerParams::new("Maria Souza", "98765432100"),
                Some("company-1"),
            )
            .await
            .unwrap();

        let logs = repo.get_by_company_id("company-1", None).await.unwrap();
        assert_eq!(logs.len(), 1);
        let entry = &logs[0];
        assert_eq!(entry.provider, "custom");
        assert_eq!(entry.operation, "createCustomer");
        assert_eq!(entry.request_data["cpfCnpj"], "987******00");
        let response = entry.response_data.as_ref().unwrap();
        assert_eq!(response["cpfCnpj"], "987******00");
        assert!(!response.to_string().contains("98765432100"));
        assert_eq!(
            entry.response_data.as_ref().map(|r| r["id"].clone()),
            Some(serde_json::Value::String(customer.id))
        );
        assert!(entry.error_message.is_none());
    }

    #[tokio::test]
    async fn test_failure_is_logged_and_returned_unchanged() {
        let repo = Arc::new(InMemoryTransactionRepository::new());
        let service = PaymentService::new(Arc::new(DownProvider::new()), Some(repo.clone()));

        let err = service.get_payment("pay_1", None).await.err().unwrap();

        assert!(matches!(err, PaymentError::ProviderUnavailable { .. }));
        let logs = repo.get_by_provider("down", None).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].operation, "getPayment");
        assert_eq!(logs[0].request_data["paymentId"], "pay_1");
        assert!(logs[0].response_data.is_none());
        assert!(
            logs[0]
                .error_message
                .as_deref()
                .is_some_and(|m| m.contains("connection refused"))
        );
        assert!(logs[0].company_id.is_none());
    }

    #[tokio::test]
    async fn test_logging_failure_is_swallowed() {
        let service = PaymentService::new(custom_gateway(), Some(Arc::new(FailingRepo)));

        let customer = service
            .create_customer(CreateCustomerParams::new("Maria Souza", "98765432100"), None)
            .await
            .unwrap();

        assert!(customer.id.starts_with("test_cus_"));
        assert_eq!(customer.name, "Maria Souza");
    }

    #[tokio::test]
    async fn test_every_operation_logs_once() {
        let (service, repo) = audited_service();
        let customer = service
            .create_customer(CreateCustomerParams::new("Maria Souza", "98765432100"), None)
            .await
            .unwrap();
        service
            .get_customer_by_cpf_cnpj("98765432100", None)
            .await
            .unwrap();
        let payment = service
            .create_payment(
                CreatePaymentParams::new(&customer.id, BillingType::Pix, dec!(250.5), due())
                    .with_external_reference("agreement-1"),
                None,
            )
            .await
            .unwrap();
        service.get_payment(&payment.id, None).await.unwrap();
        service
            .get_payment_by_external_reference("agreement-1", None)
            .await
            .unwrap();
        service
            .refund_payment(RefundParams::full(&payment.id), None)
            .await
            .unwrap();
        let _ = service.cancel_payment(&payment.id, None).await;

        let logs = repo.get_by_provider("custom", None).await.unwrap();
        let operations: Vec<_> = logs.iter().rev().map(|l| l.operation.as_str()).collect();
        assert_eq!(
            operations,
            [
                "createCustomer",
                "getCustomerByCpfCnpj",
                "createPayment",
                "getPayment",
                "getPaymentByExternalReference",
                "refundPayment",
                "cancelPayment",
            ]
        );
        // cancel after refund is an invalid transition and is still recorded
        assert!(logs[0].error_message.is_some());
    }

    #[tokio::test]
    async fn test_cancel_logs_null_response() {
        let (service, repo) = audited_service();
        let customer = service
            .create_customer(CreateCustomerParams::new("Maria Souza", "98765432100"), None)
            .await
            .unwrap();
        let payment = service
            .create_payment(
                CreatePaymentParams::new(&customer.id, BillingType::Boleto, dec!(10), due()),
                None,
            )
            .await
            .unwrap();

        service.cancel_payment(&payment.id, None).await.unwrap();

        let logs = repo.get_by_provider("custom", Some(1)).await.unwrap();
        assert_eq!(logs[0].operation, "cancelPayment");
        assert!(logs[0].response_data.is_none());
        assert!(logs[0].error_message.is_none());
    }

    #[tokio::test]
    async fn test_without_repository_nothing_is_logged() {
        let service = PaymentService::new(Arc::new(DownProvider::new()), None);

        let result = service.cancel_payment("pay_1", None).await;

        assert!(result.is_err());
        assert!(service.repository().is_none());
    }

    #[tokio::test]
    async fn test_simulate_drives_lifecycle() {
        let (service, repo) = audited_service();
        let customer = service
            .create_customer(CreateCustomerParams::new("Maria Souza", "98765432100"), None)
            .await
            .unwrap();
        let payment = service
            .create_payment(
                CreatePaymentParams::new(&customer.id, BillingType::Pix, dec!(250.5), due()),
                None,
            )
            .await
            .unwrap();

        let confirmed = service
            .simulate(SimulationAction::Confirm, &payment.id, None)
            .await
            .unwrap();
        let received = service
            .simulate(SimulationAction::Receive, &payment.id, None)
            .await
            .unwrap();

        assert_eq!(confirmed.status, PaymentStatus::Confirmed);
        assert_eq!(received.status, PaymentStatus::Received);
        let latest = repo.get_by_provider("custom", Some(1)).await.unwrap();
        assert_eq!(latest[0].operation, "simulateReceipt");
    }

    #[tokio::test]
    async fn test_simulate_unsupported_provider() {
        let provider = Arc::new(DownProvider::new());
        let service = PaymentService::new(provider.clone(), None);

        let err = service
            .simulate(SimulationAction::Overdue, "pay_1", None)
            .await
            .err()
            .unwrap();

        assert!(matches!(err, PaymentError::Configuration(_)));
        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_simulation_action_parsing() {
        assert_eq!("confirm".parse::<SimulationAction>(), Ok(SimulationAction::Confirm));
        assert_eq!("delete".parse::<SimulationAction>(), Ok(SimulationAction::Delete));
        assert!("settle".parse::<SimulationAction>().is_err());
    }

    #[test]
    fn test_parse_webhook_forwarded() {
        let service = PaymentService::new(custom_gateway(), None);

        let payload = service
            .parse_webhook(br#"{"event":"PAYMENT_CREATED","payment":{"id":"test_pay_1"}}"#)
            .unwrap();

        assert_eq!(payload.payment.id, "test_pay_1");
    }
}
