//! Bridge venue adapter implementing VenuePort.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::application::ports::{Quote, VenueError, VenuePort};
use crate::domain::instrument::SymbolInfo;
use crate::domain::shared::Symbol;
use crate::domain::trade::{OpenPosition, OrderRequest, PendingOrder, SubmitResult};

use super::api_types::{
    AccountResponse, LoginRequest, OrderResponse, PositionResponse, QuoteResponse,
    SelectResponse, SymbolInfoResponse, TradeRequestBody, TradeResultResponse,
};
use super::config::BridgeConfig;
use super::error::BridgeError;
use super::http_client::BridgeHttpClient;

/// Terminal bridge adapter.
///
/// Talks JSON over HTTP to a bridge process that owns the terminal
/// connection.
#[derive(Debug, Clone)]
pub struct BridgeVenueAdapter {
    client: BridgeHttpClient,
    login: LoginRequest,
}

impl BridgeVenueAdapter {
    /// Create a new bridge adapter. No network traffic until `initialize`.
    pub fn new(config: &BridgeConfig) -> Result<Self, BridgeError> {
        Ok(Self {
            client: BridgeHttpClient::new(config)?,
            login: LoginRequest {
                login: config.login,
                password: config.password.clone(),
                server: config.server.clone(),
            },
        })
    }

    fn book_url(&self, book: &str, symbol: Option<&Symbol>) -> reqwest::Url {
        let mut url = self.client.url(&[book]);
        if let Some(symbol) = symbol {
            url.query_pairs_mut().append_pair("symbol", symbol.as_str());
        }
        url
    }
}

#[async_trait]
impl VenuePort for BridgeVenueAdapter {
    async fn initialize(&self) -> Result<(), VenueError> {
        self.client.login(&self.login).await?;
        tracing::info!(
            login = self.login.login,
            server = %self.login.server,
            "Terminal session established"
        );
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), VenueError> {
        if !self.client.has_session() {
            return Ok(());
        }
        self.client.logout().await?;
        tracing::info!(login = self.login.login, "Terminal session released");
        Ok(())
    }

    async fn symbol_info(&self, symbol: &Symbol) -> Result<Option<SymbolInfo>, VenueError> {
        let info: Option<SymbolInfoResponse> = self
            .client
            .get_optional(self.client.url(&["symbols", symbol.as_str()]))
            .await?;
        Ok(info.map(SymbolInfoResponse::into_symbol_info))
    }

    async fn select_symbol(&self, symbol: &Symbol) -> Result<bool, VenueError> {
        let response: SelectResponse = self
            .client
            .post(
                self.client.url(&["symbols", symbol.as_str(), "select"]),
                None::<&()>,
            )
            .await?;
        Ok(response.selected)
    }

    async fn account_equity(&self) -> Result<Decimal, VenueError> {
        let account: AccountResponse = self.client.get(self.client.url(&["account"])).await?;
        Ok(account.equity)
    }

    async fn quote(&self, symbol: &Symbol) -> Result<Quote, VenueError> {
        let quote: QuoteResponse = self
            .client
            .get(self.client.url(&["quotes", symbol.as_str()]))
            .await?;
        Ok(quote.into_quote(symbol))
    }

    async fn submit_order(
        &self,
        request: &OrderRequest,
    ) -> Result<Option<SubmitResult>, VenueError> {
        let body = TradeRequestBody::from(request);

        tracing::info!(
            action = request.action.as_str(),
            symbol = ?body.symbol,
            volume = ?body.volume,
            price = ?body.price,
            comment = %body.comment,
            "Sending trade request to terminal"
        );

        let result: Option<TradeResultResponse> = self
            .client
            .post(self.client.url(&["orders"]), Some(&body))
            .await?;

        Ok(result.map(TradeResultResponse::into_submit_result))
    }

    async fn pending_orders(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<PendingOrder>, VenueError> {
        let orders: Vec<OrderResponse> = self.client.get(self.book_url("orders", symbol)).await?;
        orders
            .into_iter()
            .map(|o| o.into_pending_order().map_err(VenueError::from))
            .collect()
    }

    async fn open_positions(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<OpenPosition>, VenueError> {
        let positions: Vec<PositionResponse> =
            self.client.get(self.book_url("positions", symbol)).await?;
        positions
            .into_iter()
            .map(|p| p.into_open_position().map_err(VenueError::from))
            .collect()
    }
}
