//! Public URLs for product images in Supabase Storage.

use stockspot_core::Product;
use url::Url;

use crate::config::SupabaseConfig;

/// Builds `{base}/storage/v1/object/public/{bucket}/{image_path}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    prefix: String,
}

impl ImageUrls {
    /// URLs under `bucket` on the project at `base_url`.
    #[must_use]
    pub fn new(base_url: &Url, bucket: &str) -> Self {
        let base = base_url.as_str().trim_end_matches('/');
        let bucket = bucket.trim_matches('/');
        Self {
            prefix: format!("{base}/storage/v1/object/public/{bucket}/"),
        }
    }

    /// URL of the image at `image_path` inside the bucket.
    #[must_use]
    pub fn url_for(&self, image_path: &str) -> String {
        format!("{}{}", self.prefix, image_path.trim_start_matches('/'))
    }

    /// URL of `product`'s image, if it has one.
    #[must_use]
    pub fn product_url(&self, product: &Product) -> Option<String> {
        product
            .image_path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .map(|path| self.url_for(path))
    }
}

impl From<&SupabaseConfig> for ImageUrls {
    fn from(config: &SupabaseConfig) -> Self {
        Self::new(&config.url, &config.image_bucket)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let config = SupabaseConfig::new("https://mljdghhebfkxyjmlotks.supabase.co", "k").unwrap();
        let urls = ImageUrls::from(&config);
        assert_eq!(
            urls.url_for("dairy/oat-milk.png"),
            "https://mljdghhebfkxyjmlotks.supabase.co/storage/v1/object/public/product_images/dairy/oat-milk.png"
        );
    }

    #[test]
    fn test_product_without_image_has_no_url() {
        let urls = ImageUrls::new(&Url::parse("http://localhost:54321").unwrap(), "imgs");
        let mut product = Product {
            id: "p1".into(),
            name: "Oat Milk".to_string(),
            image_path: None,
        };
        assert_eq!(urls.product_url(&product), None);

        product.image_path = Some(String::new());
        assert_eq!(urls.product_url(&product), None);

        product.image_path = Some("p1.png".to_string());
        assert_eq!(
            urls.product_url(&product).as_deref(),
            Some("http://localhost:54321/storage/v1/object/public/imgs/p1.png")
        );
    }

    #[test]
    fn test_leading_slash_is_not_doubled() {
        let base = Url::parse("http://localhost:54321/").unwrap();
        let urls = ImageUrls::new(&base, "/thumbs/");
        assert_eq!(
            urls.url_for("/a.png"),
            "http://localhost:54321/storage/v1/object/public/thumbs/a.png"
        );
    }
}
