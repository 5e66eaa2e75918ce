use async_trait::async_trait;
use markweave_parser::{Node, NodeRef};
use markweave_transform::{Rule, RuleOutcome, Transform};
use std::rc::Rc;

/// Blocks any document containing a script element.
pub struct BlockScripts;

#[async_trait(?Send)]
impl Rule for BlockScripts {
    fn name(&self) -> &str {
        "block-scripts"
    }

    fn test(&self, node: &Node) -> bool {
        node.tag == "script"
    }

    async fn postprocessing(&self, _node: NodeRef, _tr: &Transform) -> RuleOutcome {
        // Blocking rules only gate the run; this handler never executes.
        Ok(true)
    }
}

/// Anchors that open a new tab get rel="noopener".
pub struct SecureExternalLinks;

#[async_trait(?Send)]
impl Rule for SecureExternalLinks {
    fn name(&self) -> &str {
        "secure-external-links"
    }

    fn test(&self, node: &Node) -> bool {
        node.tag == "a" && node.attribute("target") == Some("_blank")
    }

    async fn postprocessing(&self, node: NodeRef, _tr: &Transform) -> RuleOutcome {
        node.borrow_mut().set_attribute("rel", "noopener");
        Ok(true)
    }
}

/// Images without alternative text get an empty alt attribute.
pub struct EnsureImageAlt;

#[async_trait(?Send)]
impl Rule for EnsureImageAlt {
    fn name(&self) -> &str {
        "ensure-image-alt"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn test(&self, node: &Node) -> bool {
        node.tag == "img" && node.attribute("alt").is_none()
    }

    async fn postprocessing(&self, node: NodeRef, _tr: &Transform) -> RuleOutcome {
        node.borrow_mut().set_attribute("alt", "");
        Ok(true)
    }
}

/// The built-in rule set: (active, blocking).
pub fn default_rules() -> (Vec<Rc<dyn Rule>>, Vec<Rc<dyn Rule>>) {
    (
        vec![
            Rc::new(SecureExternalLinks) as Rc<dyn Rule>,
            Rc::new(EnsureImageAlt),
        ],
        vec![Rc::new(BlockScripts) as Rc<dyn Rule>],
    )
}
