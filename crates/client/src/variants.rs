//! Variant detail, mutation, stock history and supplier endpoints.

use futures::future::try_join_all;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use storeroom_core::{
    MergeRequest, NewVariant, PaginatedResponse, StockAdjustment, StockAdjustmentRequest,
    Supplier, SupplierConflict, VariantCode, VariantDetail, VariantUpdate, supplier_conflicts,
};
use tracing::{info, instrument};

use crate::client::InventoryApiClient;
use crate::error::ApiError;

const EXCEL_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

impl InventoryApiClient {
    // =========================================================================
    // Variants
    // =========================================================================

    /// Get one variant with its supplier links.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the variant does not exist.
    #[instrument(skip(self, code), fields(variant = %code))]
    pub async fn variant_detail(&self, code: &VariantCode) -> Result<VariantDetail, ApiError> {
        let url = self.endpoint(&["inventory", "variants", code.as_str()])?;
        self.get(url).await
    }

    /// Add a variant to an existing product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the variant.
    #[instrument(skip(self, variant), fields(product = %variant.product_id))]
    pub async fn create_variant(&self, variant: &NewVariant) -> Result<VariantDetail, ApiError> {
        let url = self.endpoint(&["inventory", "items", "variants"])?;
        let detail: VariantDetail = self.send_json(Method::POST, url, variant).await?;
        info!(variant = %detail.variant_code, "Variant created");
        Ok(detail)
    }

    /// Create a product together with its first variant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the product.
    #[instrument(skip(self, variant), fields(product = %variant.product_id))]
    pub async fn create_product(&self, variant: &NewVariant) -> Result<VariantDetail, ApiError> {
        let url = self.endpoint(&["inventory", "products"])?;
        let detail: VariantDetail = self.send_json(Method::POST, url, variant).await?;
        info!(variant = %detail.variant_code, "Product created");
        Ok(detail)
    }

    /// Apply a partial update; only the fields set in `update` are sent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the update.
    #[instrument(skip(self, code, update), fields(variant = %code))]
    pub async fn update_variant(
        &self,
        code: &VariantCode,
        update: &VariantUpdate,
    ) -> Result<VariantDetail, ApiError> {
        let url = self.endpoint(&["inventory", "variants", code.as_str()])?;
        let detail = self.send_json(Method::PATCH, url, update).await?;
        info!("Variant updated");
        Ok(detail)
    }

    /// Delete a variant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the delete.
    #[instrument(skip(self, code), fields(variant = %code))]
    pub async fn delete_variant(&self, code: &VariantCode) -> Result<(), ApiError> {
        let url = self.endpoint(&["inventory", "items", "variants", code.as_str()])?;
        self.send_discarding::<()>(Method::DELETE, url, None).await?;
        info!("Variant deleted");
        Ok(())
    }

    /// Merge the source variants into the target.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the merge.
    #[instrument(
        skip(self, request),
        fields(
            target_variant = %request.target_variant_code,
            sources = request.source_variant_codes.len()
        )
    )]
    pub async fn merge_variants(&self, request: &MergeRequest) -> Result<(), ApiError> {
        let url = self.endpoint(&["inventory", "variants", "merge"])?;
        self.send_discarding(Method::POST, url, Some(request)).await?;
        info!("Variants merged");
        Ok(())
    }

    /// Record a physical stock count for a variant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the adjustment.
    #[instrument(
        skip(self, code, request),
        fields(variant = %code, actual_stock = request.actual_stock)
    )]
    pub async fn adjust_stock(
        &self,
        code: &VariantCode,
        request: &StockAdjustmentRequest,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["inventory", "variants", code.as_str(), "adjust"])?;
        self.send_discarding(Method::POST, url, Some(request)).await?;
        info!("Stock adjusted");
        Ok(())
    }

    /// Upload a POS sales export (Excel) for the server to import.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the form cannot be built or the server rejects
    /// the file.
    #[instrument(skip(self, contents), fields(bytes = contents.len()))]
    pub async fn upload_inventory(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["inventory", "upload"])?;
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str(EXCEL_MIME)?;
        let form = Form::new().part("file", part);

        self.send_multipart(url, form).await?;
        info!("POS data uploaded");
        Ok(())
    }

    /// One page of stock adjustment history, newest first, optionally for a
    /// single variant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn stock_history(
        &self,
        variant: Option<&VariantCode>,
        page: u32,
    ) -> Result<PaginatedResponse<StockAdjustment>, ApiError> {
        let mut url = self.endpoint(&["inventory", "adjustments"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.max(1).to_string());
            if let Some(code) = variant {
                pairs.append_pair("variant_code", code.as_str());
            }
        }
        self.get(url).await
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// Every supplier.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn suppliers(&self) -> Result<Vec<Supplier>, ApiError> {
        let url = self.endpoint(&["supplier"])?;
        self.get(url).await
    }

    /// Suppliers linked to both `target` and any of `sources`.
    ///
    /// The variant details are fetched concurrently, then the supplier list.
    /// An empty result means the merge can go ahead.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` from any of the look-ups.
    #[instrument(
        skip(self, target, sources),
        fields(target_variant = %target, sources = sources.len())
    )]
    pub async fn merge_precheck(
        &self,
        target: &VariantCode,
        sources: &[VariantCode],
    ) -> Result<Vec<SupplierConflict>, ApiError> {
        let (target, sources) = futures::try_join!(
            self.variant_detail(target),
            try_join_all(sources.iter().map(|code| self.variant_detail(code))),
        )?;
        let suppliers = self.suppliers().await?;

        let conflicts = supplier_conflicts(&target, &sources, &suppliers);
        if !conflicts.is_empty() {
            info!(conflicts = conflicts.len(), "Merge would combine shared suppliers");
        }
        Ok(conflicts)
    }
}
