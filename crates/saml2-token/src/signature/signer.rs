//! Enveloped signature creation.
//!
//! Signs a serialized assertion in place: the `<ds:Signature>` element is
//! inserted directly after `saml:Issuer`, referencing the assertion `ID`
//! with the enveloped-signature transform followed by canonicalization.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quick_xml::escape::escape;
use roxmltree::Node;
use saml2_crypto::{HashAlgorithm, SignatureAlgorithm, SigningKeyPair};
use tracing::debug;

use crate::error::SigningError;
use crate::types::{transform_algorithms, SAML_NS, XMLDSIG_NS};
use crate::xml::{self, CanonicalizationMethod, NodeExt};

use super::{digest_algorithm_uri, signature_algorithm_uri};

const EXC_C14N_NS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
const SIGNATURE_VALUE_OPEN: &str = "<ds:SignatureValue>";

/// Configuration for signature creation.
#[derive(Debug, Clone)]
pub struct SignerOptions {
    /// Signature algorithm; the key's natural algorithm when unset.
    pub algorithm: Option<SignatureAlgorithm>,
    /// Reference digest algorithm.
    pub digest: HashAlgorithm,
    /// Canonicalization for both the reference and `SignedInfo`.
    pub canonicalization: CanonicalizationMethod,
    /// `InclusiveNamespaces PrefixList` for the reference transform.
    pub inclusive_prefixes: Vec<String>,
    /// `ds:KeyName` to embed.
    pub key_name: Option<String>,
    /// DER certificate to embed as `ds:X509Certificate`.
    pub certificate: Option<Vec<u8>>,
}

impl Default for SignerOptions {
    fn default() -> Self {
        Self {
            algorithm: None,
            digest: HashAlgorithm::Sha256,
            canonicalization: CanonicalizationMethod::ExclusiveC14N,
            inclusive_prefixes: Vec::new(),
            key_name: None,
            certificate: None,
        }
    }
}

/// Produces enveloped assertion signatures.
#[derive(Debug, Clone, Default)]
pub struct AssertionSigner {
    options: SignerOptions,
}

impl AssertionSigner {
    /// Creates a signer with the given options.
    #[must_use]
    pub const fn new(options: SignerOptions) -> Self {
        Self { options }
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> &SignerOptions {
        &self.options
    }

    /// Signs the assertion in `xml` with `key` and returns the signed text.
    ///
    /// Everything outside the inserted `<ds:Signature>` is left byte for
    /// byte as it was.
    pub fn sign(&self, xml: &str, key: &SigningKeyPair) -> Result<String, SigningError> {
        let document = xml::parse(xml)?;
        let root = document.root_element();
        if !root.is(SAML_NS, "Assertion") {
            return Err(SigningError::NotAnAssertion);
        }
        let id = root
            .attribute("ID")
            .filter(|id| !id.is_empty())
            .ok_or(SigningError::MissingId)?;
        if root.find_child(XMLDSIG_NS, "Signature").is_some() {
            return Err(SigningError::AlreadySigned);
        }

        let algorithm = self.options.algorithm.unwrap_or_else(|| key.default_algorithm());
        let canonical = xml::canonicalize(
            root,
            self.options.canonicalization.without_comments(),
            &self.options.inclusive_prefixes,
        )?;
        let digest = saml2_crypto::hash(self.options.digest, &canonical);

        let signature_xml = self.signature_template(id, algorithm, &STANDARD.encode(digest));
        let position = issuer_end(root).ok_or(SigningError::MissingIssuer)?;
        let mut signed = String::with_capacity(xml.len() + signature_xml.len() + 512);
        signed.push_str(&xml[..position]);
        signed.push_str(&signature_xml);
        signed.push_str(&xml[position..]);

        let value = {
            let reparsed = xml::parse(&signed)?;
            let signed_info = reparsed
                .root_element()
                .find_child(XMLDSIG_NS, "Signature")
                .and_then(|signature| signature.find_child(XMLDSIG_NS, "SignedInfo"))
                .ok_or(SigningError::NotAnAssertion)?;
            let canonical_signed_info =
                xml::canonicalize(signed_info, self.options.canonicalization, &[])?;
            key.sign(algorithm, &canonical_signed_info)?
        };

        // signature_xml always contains the placeholder
        let value_at = position
            + signature_xml
                .find(SIGNATURE_VALUE_OPEN)
                .map_or(0, |offset| offset + SIGNATURE_VALUE_OPEN.len());
        signed.insert_str(value_at, &STANDARD.encode(value));

        debug!(assertion_id = id, algorithm = ?algorithm, "assertion signed");
        Ok(signed)
    }

    fn signature_template(&self, id: &str, algorithm: SignatureAlgorithm, digest: &str) -> String {
        let c14n = self.options.canonicalization.uri();
        let prefix_list = if self.options.canonicalization.is_exclusive()
            && !self.options.inclusive_prefixes.is_empty()
        {
            format!(
                r#"<ec:InclusiveNamespaces xmlns:ec="{EXC_C14N_NS}" PrefixList="{}"/>"#,
                escape(&self.options.inclusive_prefixes.join(" "))
            )
        } else {
            String::new()
        };

        let mut key_info = String::new();
        if let Some(name) = &self.options.key_name {
            key_info.push_str(&format!("<ds:KeyName>{}</ds:KeyName>", escape(name)));
        }
        if let Some(certificate) = &self.options.certificate {
            key_info.push_str(&format!(
                "<ds:X509Data><ds:X509Certificate>{}</ds:X509Certificate></ds:X509Data>",
                STANDARD.encode(certificate)
            ));
        }
        if !key_info.is_empty() {
            key_info = format!("<ds:KeyInfo>{key_info}</ds:KeyInfo>");
        }

        format!(
            concat!(
                r#"<ds:Signature xmlns:ds="{ds}">"#,
                r#"<ds:SignedInfo>"#,
                r#"<ds:CanonicalizationMethod Algorithm="{c14n}"/>"#,
                r#"<ds:SignatureMethod Algorithm="{signature_method}"/>"#,
                r##"<ds:Reference URI="#{id}">"##,
                r#"<ds:Transforms>"#,
                r#"<ds:Transform Algorithm="{enveloped}"/>"#,
                r#"<ds:Transform Algorithm="{c14n}">{prefix_list}</ds:Transform>"#,
                r#"</ds:Transforms>"#,
                r#"<ds:DigestMethod Algorithm="{digest_method}"/>"#,
                r#"<ds:DigestValue>{digest}</ds:DigestValue>"#,
                r#"</ds:Reference>"#,
                r#"</ds:SignedInfo>"#,
                "{value_open}</ds:SignatureValue>",
                "{key_info}",
                r#"</ds:Signature>"#,
            ),
            ds = XMLDSIG_NS,
            c14n = c14n,
            signature_method = signature_algorithm_uri(algorithm),
            id = escape(id),
            enveloped = transform_algorithms::ENVELOPED_SIGNATURE,
            prefix_list = prefix_list,
            digest_method = digest_algorithm_uri(self.options.digest),
            digest = digest,
            value_open = SIGNATURE_VALUE_OPEN,
            key_info = key_info,
        )
    }
}

/// Byte offset just past the `Issuer` child of the root element.
fn issuer_end(root: Node<'_, '_>) -> Option<usize> {
    root.child_elements()
        .find(|child| child.is(SAML_NS, "Issuer"))
        .map(|issuer| issuer.range().end)
}
