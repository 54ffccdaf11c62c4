//! AI analysis of dashboard figures
//!
//! Summarizes a dashboard payload into a Thai prompt and asks the text
//! generator for a written business analysis.

use serde::Serialize;
use validator::Validate;

use shared::{
    format_amount, AnalyzeDashboardRequest, DashboardAnalysis, IncomeBucketSummary,
    TopProductSummary,
};

use crate::error::{AppError, AppResult};
use crate::external::TextGenerator;

const NO_TOP_PRODUCTS: &str = "ไม่มีข้อมูลสินค้าขายดี";
const NO_INCOME_SERIES: &str = "ไม่มีข้อมูลรายได้รายเดือน";

/// Analysis service
pub struct AnalysisService<'a, G> {
    generator: Option<&'a G>,
}

/// Compact series entry embedded in the prompt
#[derive(Debug, Serialize)]
struct SeriesPromptEntry<'a> {
    month: &'a str,
    online: String,
    sale: String,
    total_income: String,
}

impl<'a, G: TextGenerator> AnalysisService<'a, G> {
    pub fn new(generator: Option<&'a G>) -> Self {
        Self { generator }
    }

    /// Fail fast when no generator is configured
    pub fn ensure_configured(&self) -> AppResult<&'a G> {
        self.generator.ok_or(AppError::AiNotConfigured)
    }

    /// Validate the dashboard figures and generate the analysis
    pub async fn analyze(&self, request: AnalyzeDashboardRequest) -> AppResult<DashboardAnalysis> {
        let generator = self.ensure_configured()?;
        request.validate()?;

        let prompt = build_analysis_prompt(&request)?;
        tracing::debug!(prompt_chars = prompt.chars().count(), "Requesting dashboard analysis");

        let analysis = generator.generate(&prompt).await?;
        Ok(DashboardAnalysis { analysis })
    }
}

/// Fill the fixed prompt template with the dashboard figures
pub fn build_analysis_prompt(request: &AnalyzeDashboardRequest) -> AppResult<String> {
    let total_revenue = format_amount(request.total_all_income.unwrap_or_default());
    let top_books = summarize_top_products(request.top_products.as_deref());
    let income_series = summarize_income_series(request.monthly_income.as_deref())?;

    Ok(format!(
        "คุณคือผู้เชี่ยวชาญด้านการวิเคราะห์ธุรกิจ ช่วยวิเคราะห์ข้อมูลการขายนี้เพื่อหาแนวโน้ม, จุดแข็ง, จุดอ่อน, และให้คำแนะนำเชิงกลยุทธ์ในอนาคต

**ข้อมูลปัจจุบัน (ทั้งหมดในสกุลเงินบาท):**
- รายได้รวมทั้งหมด: {total_revenue} บาท
- สินค้าขายดี 5 อันดับแรก: {top_books}
- ข้อมูลรายได้รายเดือน/รายวัน: {income_series}

โปรดเขียนบทวิเคราะห์เป็นภาษาไทยอย่างละเอียดในลักษณะเป็นมืออาชีพ ความยาวประมาณ 4-5 ย่อหน้า โดยเน้นไปที่:
1. แนวโน้มรายได้ (Revenue Trends) และสุขภาพทางการเงินโดยรวม
2. การวิเคราะห์สินค้าขายดี (Top Sellers) และโอกาสในการทำ Cross-sell หรือ Up-sell
3. คำแนะนำเชิงกลยุทธ์สำหรับการเติบโตของยอดขายและผลกำไรในไตรมาสถัดไป
4. จุดที่น่ากังวลหรือควรปรับปรุง
"
    ))
}

fn summarize_top_products(products: Option<&[TopProductSummary]>) -> String {
    match products {
        Some(products) if !products.is_empty() => products
            .iter()
            .map(|p| {
                format!(
                    "{} (ขาย {} ชิ้น, รายได้ {} บาท)",
                    p.name,
                    p.total_sold,
                    format_amount(p.total_revenue)
                )
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => NO_TOP_PRODUCTS.to_string(),
    }
}

fn summarize_income_series(series: Option<&[IncomeBucketSummary]>) -> AppResult<String> {
    match series {
        Some(series) if !series.is_empty() => {
            let entries: Vec<SeriesPromptEntry> = series
                .iter()
                .map(|bucket| SeriesPromptEntry {
                    month: &bucket.month,
                    online: format_amount(bucket.online_income),
                    sale: format_amount(bucket.sale_income),
                    total_income: format_amount(bucket.income),
                })
                .collect();
            serde_json::to_string(&entries)
                .map_err(|e| AppError::Internal(format!("Failed to encode income series: {}", e)))
        }
        _ => Ok(NO_INCOME_SERIES.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockGenerator {
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
        fail: bool,
    }

    impl MockGenerator {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
                fail,
            }
        }
    }

    impl TextGenerator for MockGenerator {
        async fn generate(&self, prompt: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            if self.fail {
                Err(AppError::AiProviderUnavailable("503 overloaded".to_string()))
            } else {
                Ok("ยอดขายเติบโตอย่างต่อเนื่อง".to_string())
            }
        }
    }

    fn sample_request() -> AnalyzeDashboardRequest {
        AnalyzeDashboardRequest {
            total_all_income: Some(Decimal::new(12345675, 1)),
            top_products: Some(vec![TopProductSummary {
                name: "แฮร์รี่ พอตเตอร์".to_string(),
                total_sold: 12,
                total_revenue: Decimal::from(4200),
            }]),
            monthly_income: Some(vec![IncomeBucketSummary {
                month: "ม.ค.".to_string(),
                online_income: Decimal::from(1000),
                sale_income: Decimal::from(2500),
                income: Decimal::from(3500),
            }]),
        }
    }

    #[test]
    fn test_prompt_contains_formatted_figures() {
        let prompt = build_analysis_prompt(&sample_request()).unwrap();
        assert!(prompt.contains("รายได้รวมทั้งหมด: 1,234,567.5 บาท"));
        assert!(prompt.contains("แฮร์รี่ พอตเตอร์ (ขาย 12 ชิ้น, รายได้ 4,200 บาท)"));
        assert!(prompt.contains(
            r#"[{"month":"ม.ค.","online":"1,000","sale":"2,500","total_income":"3,500"}]"#
        ));
        assert!(prompt.contains("4-5 ย่อหน้า"));
    }

    #[test]
    fn test_prompt_fallbacks_for_missing_data() {
        let prompt = build_analysis_prompt(&AnalyzeDashboardRequest::default()).unwrap();
        assert!(prompt.contains("รายได้รวมทั้งหมด: 0 บาท"));
        assert!(prompt.contains(NO_TOP_PRODUCTS));
        assert!(prompt.contains(NO_INCOME_SERIES));

        let empty = AnalyzeDashboardRequest {
            top_products: Some(Vec::new()),
            monthly_income: Some(Vec::new()),
            ..Default::default()
        };
        let prompt = build_analysis_prompt(&empty).unwrap();
        assert!(prompt.contains(NO_TOP_PRODUCTS));
        assert!(prompt.contains(NO_INCOME_SERIES));
    }

    #[test]
    fn test_top_products_joined_with_semicolons() {
        let products = [
            TopProductSummary {
                name: "A".to_string(),
                total_sold: 2,
                total_revenue: Decimal::from(10),
            },
            TopProductSummary {
                name: "B".to_string(),
                total_sold: 1,
                total_revenue: Decimal::from(5),
            },
        ];
        assert_eq!(
            summarize_top_products(Some(&products)),
            "A (ขาย 2 ชิ้น, รายได้ 10 บาท); B (ขาย 1 ชิ้น, รายได้ 5 บาท)"
        );
    }

    #[tokio::test]
    async fn test_analyze_without_generator_makes_no_call() {
        let service = AnalysisService::<MockGenerator>::new(None);
        let result = service.analyze(sample_request()).await;
        assert!(matches!(result, Err(AppError::AiNotConfigured)));
    }

    #[tokio::test]
    async fn test_analyze_returns_generated_text() {
        let generator = MockGenerator::new(false);
        let service = AnalysisService::new(Some(&generator));

        let analysis = service.analyze(sample_request()).await.unwrap();
        assert_eq!(analysis.analysis, "ยอดขายเติบโตอย่างต่อเนื่อง");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("1,234,567.5"));
    }

    #[tokio::test]
    async fn test_analyze_rejects_invalid_figures_before_calling() {
        let generator = MockGenerator::new(false);
        let service = AnalysisService::new(Some(&generator));

        let mut request = sample_request();
        request.total_all_income = Some(Decimal::from(-1));

        let result = service.analyze(request).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_propagates_provider_failure() {
        let generator = MockGenerator::new(true);
        let service = AnalysisService::new(Some(&generator));

        let result = service.analyze(sample_request()).await;
        assert!(matches!(result, Err(AppError::AiProviderUnavailable(_))));
    }
}
