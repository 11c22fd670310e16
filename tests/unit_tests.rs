use clap::Parser;
use cvat2coco::config::{DEFAULT_CATEGORY_ID, DEFAULT_CLASS_NAME, DEFAULT_KEYPOINT_NAMES};
use cvat2coco::conversion::fill_keypoint_slots;
use cvat2coco::cvat::parse_point;
use cvat2coco::xml_tree::parse_document;
use cvat2coco::{Args, BoxRecord, ConvertError, KeypointRecord, KeypointSchema, Visibility};

fn unit_box() -> BoxRecord {
    BoxRecord {
        label: "Forklift".to_string(),
        occluded: false,
        xtl: 0.0,
        ytl: 0.0,
        xbr: 10.0,
        ybr: 10.0,
    }
}

fn keypoint(label: &str, x: f64, y: f64, occluded: bool) -> KeypointRecord {
    KeypointRecord {
        label: label.to_string(),
        occluded,
        x,
        y,
    }
}

#[test]
fn test_parse_point() {
    assert_eq!(parse_point("5,5"), Some((5.0, 5.0)));
    assert_eq!(parse_point("12.50,7.25"), Some((12.5, 7.25)));
    assert_eq!(parse_point(" 1.5 , 2 "), Some((1.5, 2.0)));
    assert_eq!(parse_point("-3,4"), Some((-3.0, 4.0)));

    assert_eq!(parse_point(""), None);
    assert_eq!(parse_point("5"), None);
    assert_eq!(parse_point("5,"), None);
    assert_eq!(parse_point("5,5,5"), None);
    assert_eq!(parse_point("1,2;3,4"), None);
    assert_eq!(parse_point("a,b"), None);
    assert_eq!(parse_point("NaN,1"), None);
    assert_eq!(parse_point("(5, 5)"), None);
}

#[test]
fn test_box_contains_is_inclusive() {
    let bbox = unit_box();

    assert!(bbox.contains(5.0, 5.0));
    assert!(bbox.contains(0.0, 0.0));
    assert!(bbox.contains(10.0, 10.0));
    assert!(bbox.contains(0.0, 10.0));
    assert!(bbox.contains(10.0, 5.0));

    assert!(!bbox.contains(-1.0, 5.0));
    assert!(!bbox.contains(11.0, 5.0));
    assert!(!bbox.contains(5.0, -1.0));
    assert!(!bbox.contains(5.0, 11.0));
}

#[test]
fn test_box_to_coco_bbox() {
    let bbox = BoxRecord {
        label: "Forklift".to_string(),
        occluded: false,
        xtl: 12.5,
        ytl: 20.0,
        xbr: 112.5,
        ybr: 70.0,
    };
    assert_eq!(bbox.to_coco_bbox(), [12.5, 20.0, 100.0, 50.0]);
}

#[test]
fn test_visibility_codes() {
    assert_eq!(Visibility::NotInImage.code(), 0.0);
    assert_eq!(Visibility::Occluded.code(), 1.0);
    assert_eq!(Visibility::Visible.code(), 2.0);

    assert_eq!(keypoint("LFrontWheel", 1.0, 1.0, true).visibility(), Visibility::Occluded);
    assert_eq!(keypoint("LFrontWheel", 1.0, 1.0, false).visibility(), Visibility::Visible);
}

#[test]
fn test_default_schema() {
    let schema = KeypointSchema::default();

    assert_eq!(schema.class_name(), DEFAULT_CLASS_NAME);
    assert_eq!(schema.category_id(), DEFAULT_CATEGORY_ID);
    assert_eq!(schema.num_keypoints(), 10);
    assert_eq!(schema.slot_of("LFrontWheel"), Some(0));
    assert_eq!(schema.slot_of("RBackWheel"), Some(3));
    assert_eq!(schema.slot_of("RMastTop"), Some(9));
    assert_eq!(schema.slot_of("Steering"), None);
}

#[test]
fn test_schema_validation() {
    let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    assert!(KeypointSchema::new("Pallet".to_string(), names(&["a", "b"]), 3).is_ok());
    assert!(matches!(
        KeypointSchema::new("Pallet".to_string(), Vec::new(), 1),
        Err(ConvertError::InvalidConfig(_))
    ));
    assert!(matches!(
        KeypointSchema::new("Pallet".to_string(), names(&["a", "a"]), 1),
        Err(ConvertError::InvalidConfig(_))
    ));
    assert!(matches!(
        KeypointSchema::new("Pallet".to_string(), names(&["a", ""]), 1),
        Err(ConvertError::InvalidConfig(_))
    ));
    assert!(matches!(
        KeypointSchema::new(" ".to_string(), names(&["a"]), 1),
        Err(ConvertError::InvalidConfig(_))
    ));
}

#[test]
fn test_args_defaults() {
    let args = Args::try_parse_from(["cvat2coco", "-i", "in.xml", "-o", "out.json"]).unwrap();

    assert_eq!(args.input.to_str(), Some("in.xml"));
    assert_eq!(args.output.to_str(), Some("out.json"));
    assert_eq!(args.dataset, "COCO Keypoints Dataset");
    assert_eq!(args.keypoints, DEFAULT_KEYPOINT_NAMES.to_vec());
    assert!(!args.pretty);
    assert!(!args.license_list);
    assert_eq!(args.to_schema().unwrap(), KeypointSchema::default());
}

#[test]
fn test_args_overrides() {
    let args = Args::try_parse_from([
        "cvat2coco",
        "--input",
        "in.xml",
        "--output",
        "out.json",
        "--dataset",
        "Warehouse",
        "--class_name",
        "Pallet",
        "--keypoints",
        "Left,Right,Top",
        "--category_id",
        "7",
        "--pretty",
        "--license_list",
    ])
    .unwrap();

    let schema = args.to_schema().unwrap();
    assert_eq!(schema.class_name(), "Pallet");
    assert_eq!(schema.keypoint_names(), ["Left", "Right", "Top"]);
    assert_eq!(schema.category_id(), 7);

    let options = args.output_options();
    assert!(options.pretty);
    assert!(options.license_list);
}

#[test]
fn test_args_require_input_and_output() {
    assert!(Args::try_parse_from(["cvat2coco", "-o", "out.json"]).is_err());
    assert!(Args::try_parse_from(["cvat2coco", "-i", "in.xml"]).is_err());
}

#[test]
fn test_xml_tree_queries() {
    let xml = r#"<root a="1">
        <group><item id="x"/><item id="y"><item id="z"/></item></group>
        <item id="w">text</item>
    </root>"#;
    let root = parse_document(xml.as_bytes()).unwrap();

    assert_eq!(root.name, "root");
    assert_eq!(root.attr("a"), Some("1"));
    assert_eq!(root.attr("b"), None);

    let ids: Vec<_> = root.find_all("item").filter_map(|e| e.attr("id")).collect();
    assert_eq!(ids, ["x", "y", "z", "w"]);

    assert_eq!(root.find("item").and_then(|e| e.attr("id")), Some("x"));
    assert_eq!(root.children_named("item").count(), 1);
    assert_eq!(root.children_named("item").next().unwrap().text, "text");
    assert!(root.find("missing").is_none());
}

#[test]
fn test_xml_tree_rejects_malformed_document() {
    assert!(matches!(
        parse_document("<root><open></root>".as_bytes()),
        Err(ConvertError::Xml(_))
    ));
    assert!(parse_document("".as_bytes()).is_err());
}

#[test]
fn test_fill_keypoint_slots() {
    let bbox = unit_box();
    let inside = keypoint("LFrontWheel", 5.0, 5.0, false);
    let occluded = keypoint("RFrontWheel", 2.0, 3.0, true);
    let outside = keypoint("RBackWheel", 50.0, 50.0, false);

    let slots = fill_keypoint_slots(
        10,
        &bbox,
        &[(0, &inside), (1, &occluded), (3, &outside)],
    );

    assert_eq!(slots.len(), 30);
    assert_eq!(&slots[0..3], &[5.0, 5.0, 2.0]);
    assert_eq!(&slots[3..6], &[2.0, 3.0, 1.0]);
    assert_eq!(&slots[9..12], &[0.0, 0.0, 0.0]);
    assert!(slots[6..9].iter().chain(&slots[12..]).all(|v| *v == 0.0));
}

#[test]
fn test_fill_keypoint_slots_later_duplicate_wins() {
    let bbox = unit_box();
    let first = keypoint("LFrontWheel", 1.0, 1.0, false);
    let second = keypoint("LFrontWheel", 2.0, 2.0, true);

    let slots = fill_keypoint_slots(10, &bbox, &[(0, &first), (0, &second)]);
    assert_eq!(&slots[0..3], &[2.0, 2.0, 1.0]);
}
