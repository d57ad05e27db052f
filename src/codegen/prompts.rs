//! Prompt assembly for dataset-module scaffolding

/// Base class every generated dataset module must inherit from
pub const BASE_MODULE_REFERENCE: &str = r#"### base.py

from typing import List, Dict, Any, Optional

class BaseDataset:
    """
    Abstract base class that all dataset classes should inherit from.

    Purpose:
      1) To provide a consistent interface expected by the evaluation pipeline.
      2) To allow easy customization of dataset-specific loading/preprocessing logic.

    Required Method:
      - load(): Loads the data and returns a list of dictionaries in the format [{"input":..., "reference":...}, ...].
    """

    def __init__(self, dataset_name: str, split: str = "test", subset: str = None, base_prompt_template : str = None, **kwargs):
        self.dataset_name = dataset_name
        self.split = split
        self.subset = subset
        self.base_prompt_template = base_prompt_template
        self.kwargs = kwargs

    def load(self) -> List[Dict[str, Any]]:
        raise NotImplementedError("Subclasses must implement load().")
"#;

/// Registry module the generated code must plug into
pub const REGISTRY_REFERENCE: &str = r#"### __init__.py

from typing import Dict, Type
from .base import BaseDataset

DATASET_REGISTRY: Dict[str, Type[BaseDataset]] = {}

def register_dataset(name: str):
    def decorator(cls: Type[BaseDataset]):
        if name in DATASET_REGISTRY:
            raise ValueError(f"Dataset '{name}' already registered.")
        DATASET_REGISTRY[name] = cls
        return cls
    return decorator

def load_datasets(name: str, split: str = "test", **kwargs) -> BaseDataset:
    if name not in DATASET_REGISTRY:
        raise ValueError(f"Unknown dataset: {name}. Please register it in DATASET_REGISTRY.")
    dataset_class = DATASET_REGISTRY[name]
    return dataset_class(split=split, **kwargs)
"#;

/// Build the guide prompt from the translated table preview
pub fn guide_prompt(markdown_table: &str) -> String {
    format!(
        "아래는 haerae-evaluation-toolkit의 dataset 모듈을 개발하기 위한 가이드입니다.\n\
         \n\
         상속해야 하는 base 클래스와 __init__.py의 내용은 아래와 같습니다.\n\
         \n\
         {base}\n\
         \n\
         {registry}\n\
         \n\
         번역된 데이터셋의 구조 및 상위 5개 행은 다음과 같습니다:\n\
         \n\
         {table}\n\
         \n\
         위의 정보를 참고하여, 완전히 동작하는 dataset 모듈 코드를 생성해 주세요.\n\
         생성된 모듈은 BaseDataset을 상속받아 모든 기능이 동작하도록 구현해야 합니다.\n",
        base = BASE_MODULE_REFERENCE,
        registry = REGISTRY_REFERENCE,
        table = markdown_table,
    )
}
