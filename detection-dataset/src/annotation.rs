//! VOC-style XML annotation files.

use crate::common::*;
use roxmltree::{Document, Node};
use std::str::FromStr;

/// The annotation of one image.
///
/// Elements other than the ones listed here are ignored, wherever they
/// appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub filename: Option<String>,
    pub size: Option<Size>,
    pub objects: Vec<Object>,
}

/// The image size recorded in the annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
    pub depth: Option<u32>,
}

/// An annotated object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub name: Option<String>,
    pub bndbox: Option<BndBox>,
}

/// Corner-form box in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BndBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl BndBox {
    fn from_node(node: Node) -> anyhow::Result<Self> {
        Ok(Self {
            xmin: parse_child(node, "xmin")?,
            ymin: parse_child(node, "ymin")?,
            xmax: parse_child(node, "xmax")?,
            ymax: parse_child(node, "ymax")?,
        })
    }

    /// Widen to `i64`, so that sizes and centers never overflow.
    pub fn to_tlbr(&self) -> anyhow::Result<PixelTLBR<i64>> {
        let Self {
            xmin,
            ymin,
            xmax,
            ymax,
        } = *self;
        let tlbr = TLBR::try_from_tlbr([ymin, xmin, ymax, xmax].map(i64::from))
            .with_context(|| format!("invalid bndbox {:?}", self))?;
        Ok(Pixel(tlbr))
    }
}

impl Size {
    fn from_node(node: Node) -> anyhow::Result<Self> {
        Ok(Self {
            width: parse_child(node, "width")?,
            height: parse_child(node, "height")?,
            depth: child(node, "depth")
                .map(|_| parse_child(node, "depth"))
                .transpose()?,
        })
    }
}

impl Object {
    fn from_node(node: Node) -> anyhow::Result<Self> {
        Ok(Self {
            name: child(node, "name").map(|name| text(name).to_owned()),
            bndbox: child(node, "bndbox")
                .map(BndBox::from_node)
                .transpose()
                .context("invalid bndbox element")?,
        })
    }
}

impl Annotation {
    /// Read and parse an annotation file.
    pub fn open(path: impl AsRef<Path>) -> DatasetResult<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|source| DatasetError::ReadAnnotation {
            path: path.to_owned(),
            source,
        })?;
        Self::parse_str(&xml).map_err(|err| DatasetError::parse(path, format!("{:#}", err)))
    }

    pub fn parse_str(xml: &str) -> anyhow::Result<Self> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();

        let filename = child(root, "filename").map(|node| text(node).to_owned());
        let size = child(root, "size")
            .map(Size::from_node)
            .transpose()
            .context("invalid size element")?;
        let objects: Vec<_> = root
            .children()
            .filter(|node| node.has_tag_name("object"))
            .map(Object::from_node)
            .collect::<anyhow::Result<_>>()?;

        Ok(Self {
            filename,
            size,
            objects,
        })
    }

    /// The box of the first object. Further objects are not considered.
    pub fn first_box(&self) -> anyhow::Result<PixelTLBR<i64>> {
        let object = self
            .objects
            .first()
            .ok_or_else(|| format_err!("no object element found"))?;
        let bndbox = object
            .bndbox
            .as_ref()
            .ok_or_else(|| format_err!("the first object has no bndbox element"))?;
        bndbox.to_tlbr()
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("").trim()
}

fn parse_child<T>(node: Node, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let element = child(node, name).ok_or_else(|| format_err!("missing {} element", name))?;
    let value = text(element);
    value
        .parse()
        .with_context(|| format!("invalid {} value '{}'", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOC_SAMPLE: &str = r#"
<annotation>
    <folder>VOC2007</folder>
    <filename>000001.jpg</filename>
    <size>
        <width>353</width>
        <height>500</height>
        <depth>3</depth>
    </size>
    <segmented>0</segmented>
    <object>
        <name>dog</name>
        <pose>Left</pose>
        <truncated>1</truncated>
        <difficult>0</difficult>
        <bndbox>
            <xmin>48</xmin>
            <ymin>240</ymin>
            <xmax>195</xmax>
            <ymax>371</ymax>
        </bndbox>
    </object>
    <object>
        <name>person</name>
        <pose>Left</pose>
        <truncated>1</truncated>
        <difficult>0</difficult>
        <bndbox>
            <xmin>8</xmin>
            <ymin>12</ymin>
            <xmax>352</xmax>
            <ymax>498</ymax>
        </bndbox>
    </object>
</annotation>
"#;

    #[test]
    fn parse_voc_annotation() {
        let annotation = Annotation::parse_str(VOC_SAMPLE).unwrap();
        assert_eq!(annotation.filename.as_deref(), Some("000001.jpg"));
        assert_eq!(
            annotation.size,
            Some(Size {
                width: 353,
                height: 500,
                depth: Some(3)
            })
        );
        assert_eq!(annotation.objects.len(), 2);
        assert_eq!(annotation.objects[1].name.as_deref(), Some("person"));
    }

    #[test]
    fn only_first_object_is_used() {
        let annotation = Annotation::parse_str(VOC_SAMPLE).unwrap();
        let Pixel(tlbr) = annotation.first_box().unwrap();
        assert_eq!(tlbr.tlbr(), [240, 48, 371, 195]);
    }

    #[test]
    fn minimal_annotation() {
        let text = "<annotation><object><bndbox><xmin>10</xmin><ymin>20</ymin>\
                    <xmax>50</xmax><ymax>120</ymax></bndbox></object></annotation>";
        let annotation = Annotation::parse_str(text).unwrap();
        assert_eq!(annotation.filename, None);
        assert_eq!(annotation.size, None);
        let Pixel(tlbr) = annotation.first_box().unwrap();
        assert_eq!(tlbr.tlbr(), [20, 10, 120, 50]);
    }

    #[test]
    fn missing_bndbox() {
        let text = "<annotation><object><name>cat</name></object></annotation>";
        let annotation = Annotation::parse_str(text).unwrap();
        assert!(annotation.first_box().is_err());
    }

    #[test]
    fn missing_object() {
        let text = "<annotation><filename>a.jpg</filename></annotation>";
        let annotation = Annotation::parse_str(text).unwrap();
        assert!(annotation.objects.is_empty());
        assert!(annotation.first_box().is_err());
    }

    #[test]
    fn inverted_box() {
        let text = "<annotation><object><bndbox><xmin>50</xmin><ymin>20</ymin>\
                    <xmax>10</xmax><ymax>120</ymax></bndbox></object></annotation>";
        let annotation = Annotation::parse_str(text).unwrap();
        assert!(annotation.first_box().is_err());
    }

    #[test]
    fn objects_separated_by_other_elements() {
        let text = "<annotation>\
                      <object><name>cat</name><bndbox><xmin>1</xmin><ymin>2</ymin>\
                        <xmax>3</xmax><ymax>4</ymax></bndbox></object>\
                      <segmented>0</segmented>\
                      <object><name>dog</name><bndbox><xmin>5</xmin><ymin>6</ymin>\
                        <xmax>7</xmax><ymax>8</ymax></bndbox></object>\
                    </annotation>";
        let annotation = Annotation::parse_str(text).unwrap();
        let names: Vec<_> = annotation
            .objects
            .iter()
            .map(|object| object.name.as_deref())
            .collect();
        assert_eq!(names, [Some("cat"), Some("dog")]);
        let Pixel(tlbr) = annotation.first_box().unwrap();
        assert_eq!(tlbr.tlbr(), [2, 1, 4, 3]);
    }

    #[test]
    fn extreme_coordinates() {
        let text = "<annotation><object><bndbox><xmin>-2147483648</xmin><ymin>0</ymin>\
                    <xmax>2147483647</xmax><ymax>1</ymax></bndbox></object></annotation>";
        let annotation = Annotation::parse_str(text).unwrap();
        let Pixel(tlbr) = annotation.first_box().unwrap();
        assert_eq!(tlbr.w(), 4294967295);

        let text = "<annotation><object><bndbox><xmin>-9223372036854775808</xmin><ymin>0</ymin>\
                    <xmax>9223372036854775807</xmax><ymax>1</ymax></bndbox></object></annotation>";
        assert!(Annotation::parse_str(text).is_err());
    }

    #[test]
    fn malformed_xml() {
        assert!(Annotation::parse_str("<annotation><object></annotation>").is_err());
        let text = "<annotation><object><bndbox><xmin>ten</xmin><ymin>20</ymin>\
                    <xmax>50</xmax><ymax>120</ymax></bndbox></object></annotation>";
        assert!(Annotation::parse_str(text).is_err());
    }
}
